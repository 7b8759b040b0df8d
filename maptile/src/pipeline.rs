//! Ordered, fail-fast step execution.
//!
//! A [`Pipeline`] runs its tasks one after another against a shared context
//! and stops at the first failure, reporting which step failed. There is no
//! retry and no continue-on-error mode.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use maptile_shared::{MaptileError, MaptileResult};

/// A named unit of work in a pipeline.
#[async_trait]
pub trait PipelineTask<C: Send + 'static>: Send + Sync {
    async fn run(&self, ctx: &mut C) -> MaptileResult<()>;

    /// Stable step name used in logs and failure reports.
    fn name(&self) -> &str;

    /// The task bounds its own slow calls; the pipeline step timeout is not
    /// applied to it.
    fn enforces_own_deadline(&self) -> bool {
        false
    }
}

/// The first step that failed, and why.
#[derive(Debug)]
pub struct StepFailure {
    pub step: String,
    pub error: MaptileError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step '{}' failed: {}", self.step, self.error)
    }
}

impl std::error::Error for StepFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct Pipeline<C: Send + 'static> {
    label: &'static str,
    tasks: Vec<Box<dyn PipelineTask<C>>>,
    step_timeout: Option<Duration>,
}

impl<C: Send + 'static> Pipeline<C> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            tasks: Vec::new(),
            step_timeout: None,
        }
    }

    /// Append a task; tasks run in insertion order.
    pub fn then(mut self, task: impl PipelineTask<C> + 'static) -> Self {
        self.tasks.push(Box::new(task));
        self
    }

    /// Fail any single step that runs longer than `timeout`.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub async fn run(&self, ctx: &mut C) -> Result<(), StepFailure> {
        tracing::debug!(
            pipeline = self.label,
            steps = ?self.step_names(),
            "Pipeline started"
        );

        for task in &self.tasks {
            let step = task.name();
            let started = Instant::now();
            tracing::debug!(pipeline = self.label, step, "Step started");

            let result = match self.step_timeout {
                Some(limit) if !task.enforces_own_deadline() => {
                    tokio::time::timeout(limit, task.run(ctx))
                        .await
                        .unwrap_or_else(|_| {
                            Err(MaptileError::Timeout(format!(
                                "step '{step}' did not finish within {}s",
                                limit.as_secs_f64()
                            )))
                        })
                }
                _ => task.run(ctx).await,
            };

            if let Err(error) = result {
                tracing::error!(
                    pipeline = self.label,
                    step,
                    kind = error.kind(),
                    error = %error,
                    "Step failed"
                );
                return Err(StepFailure {
                    step: step.to_string(),
                    error,
                });
            }

            tracing::info!(
                pipeline = self.label,
                step,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Step completed"
            );
        }

        tracing::debug!(pipeline = self.label, "Pipeline finished");
        Ok(())
    }
}
