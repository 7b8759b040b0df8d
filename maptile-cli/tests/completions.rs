use predicates::prelude::*;

mod common;

#[test]
fn test_bash_completions() {
    let mut ctx = common::maptile_bare();

    ctx.cmd
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("maptile"))
        .stdout(predicate::str::contains("check"));
}
