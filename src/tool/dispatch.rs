//! Fire-and-forget action dispatch
//!
//! Menu activations push a full command line into a one-way queue; a worker
//! task invokes the tool and logs the outcome. Callers never await
//! completion, and dispatched actions do not take the refresh guard, so a
//! set-value command may overlap an in-flight status refresh.

use crate::tool::runner::ToolRunner;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One-way command queue for user-triggered actions.
#[derive(Clone)]
pub struct ActionDispatcher {
    tx: mpsc::UnboundedSender<String>,
}

impl ActionDispatcher {
    /// Spawn the worker task draining the queue against `runner`.
    pub fn spawn<R: ToolRunner + 'static>(runner: Arc<R>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(command_line) = rx.recv().await {
                match runner.execute(&command_line).await {
                    Ok(output) => {
                        debug!(command = %command_line, output = %output.trim(), "action completed")
                    }
                    Err(err) => warn!(command = %command_line, %err, "action failed"),
                }
            }
        });
        Self { tx }
    }

    /// Queue a command line; returns immediately.
    pub fn dispatch(&self, command_line: impl Into<String>) {
        let command_line = command_line.into();
        debug!(command = %command_line, "dispatching action");
        if self.tx.send(command_line).is_err() {
            warn!("action worker gone, command dropped");
        }
    }
}
