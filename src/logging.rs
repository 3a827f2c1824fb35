//! Step logging for generation stages.
//!
//! Stages report `(operation, duration, detail)` triples through a
//! [`StepLogger`]. The default sink forwards them to `tracing`.

use std::fmt::Display;
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, info};

/// Sink for timed generation steps.
pub trait StepLogger: Send + Sync {
    fn log_step(&self, operation: &str, duration_ms: f64, detail: &str);
    fn debug(&self, message: &str);
}

/// Forwards steps to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl StepLogger for TracingLogger {
    fn log_step(&self, operation: &str, duration_ms: f64, detail: &str) {
        info!(operation, duration_ms, detail, "step finished");
    }

    fn debug(&self, message: &str) {
        debug!("{}", message);
    }
}

/// A recorded [`StepLogger::log_step`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedStep {
    pub operation: String,
    pub duration_ms: f64,
    pub detail: String,
}

/// Keeps every step in memory, for reports and tests.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    steps: Mutex<Vec<LoggedStep>>,
    messages: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> Vec<LoggedStep> {
        self.steps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl StepLogger for MemoryLogger {
    fn log_step(&self, operation: &str, duration_ms: f64, detail: &str) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push(LoggedStep {
                operation: operation.to_string(),
                duration_ms,
                detail: detail.to_string(),
            });
        }
    }

    fn debug(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// Runs `step`, then logs its duration under `operation`.
///
/// On success the detail comes from `describe`; on failure it is
/// `"Error: <message>"` and the error is returned unchanged.
pub fn timed_step<T, E, F, D>(
    logger: &dyn StepLogger,
    operation: &str,
    step: F,
    describe: D,
) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    D: FnOnce(&T) -> String,
    E: Display,
{
    let start = Instant::now();
    let result = step();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(value) => logger.log_step(operation, elapsed_ms, &describe(value)),
        Err(e) => logger.log_step(operation, elapsed_ms, &format!("Error: {}", e)),
    }
    result
}
