pub mod check;
pub mod clean;
pub mod completions;
pub mod setup;
pub mod validate;
