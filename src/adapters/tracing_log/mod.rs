// Tracing log adapter - Mirrors job events into structured logs

use tracing::{debug, error, info, warn};

use crate::ports::{JobEvent, JobObserver};

/// Job observer that writes every event through `tracing`
pub struct TracingLogObserver {
    /// Emit engine log lines at debug level
    engine_lines: bool,
}

impl TracingLogObserver {
    pub fn new() -> Self {
        Self { engine_lines: true }
    }

    /// Stop forwarding raw engine output
    pub fn without_engine_lines(mut self) -> Self {
        self.engine_lines = false;
        self
    }
}

impl Default for TracingLogObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl JobObserver for TracingLogObserver {
    fn on_event(&self, event: &JobEvent) {
        match event {
            JobEvent::StateChanged(state) => info!(?state, "job state changed"),
            JobEvent::Progress { ratio, label } => {
                debug!(percent = (ratio * 100.0).round() as u32, %label, "progress")
            }
            JobEvent::Log(line) => {
                if self.engine_lines {
                    debug!(target: "clipmerge::engine", "{}", line);
                }
            }
            JobEvent::Warning(message) => warn!("{}", message),
            JobEvent::Failed { kind, message } => error!(?kind, "{}", message),
        }
    }
}
