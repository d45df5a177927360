//! Progress tracking and observer fan-out for merge jobs

use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::domain::model::JobState;
use crate::error::MergeError;
use crate::ports::{EngineEvent, EngineEventSink, JobEvent, JobObserver};

/// Default number of log characters retained
pub const DEFAULT_LOG_CAPACITY: usize = 8000;

/// Tail of the engine log, bounded in characters
#[derive(Debug, Clone)]
pub struct LogBuffer {
    text: String,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity,
        }
    }

    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
        let chars = self.text.chars().count();
        if chars > self.capacity {
            let cut = self
                .text
                .char_indices()
                .nth(chars - self.capacity)
                .map(|(i, _)| i)
                .unwrap_or(self.text.len());
            self.text.drain(..cut);
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Point-in-time view of a running job
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub state: JobState,
    pub ratio: f64,
    pub label: String,
}

struct ReporterInner {
    state: JobState,
    ratio: f64,
    label: String,
    step: usize,
    total_steps: usize,
    log: LogBuffer,
}

/// Turns engine events into a clamped, monotonic job ratio plus phase text,
/// and fans every job event out to the registered observers.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Arc<Mutex<ReporterInner>>,
    observers: Arc<Mutex<Vec<Arc<dyn JobObserver>>>>,
}

impl ProgressReporter {
    pub fn new(log_capacity: usize) -> Self {
        let inner = ReporterInner {
            state: JobState::Idle,
            ratio: 0.0,
            label: String::new(),
            step: 0,
            total_steps: 1,
            log: LogBuffer::new(log_capacity),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn JobObserver>) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(observer);
        }
    }

    /// Forget the previous job's progress and log
    pub fn reset(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.ratio = 0.0;
            inner.label.clear();
            inner.step = 0;
            inner.total_steps = 1;
            inner.log.clear();
        }
    }

    pub fn state(&self) -> JobState {
        self.inner
            .lock()
            .map(|inner| inner.state)
            .unwrap_or(JobState::Failed)
    }

    pub fn set_state(&self, state: JobState) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = state;
        }
        self.notify(JobEvent::StateChanged(state));
    }

    /// Number of engine operations the job will run
    pub fn set_total_steps(&self, total: usize) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.total_steps = total.max(1);
        }
    }

    /// Enter the next engine operation with a phase label
    pub fn begin_step(&self, step: usize, label: impl Into<String>) {
        let label = label.into();
        if let Ok(mut inner) = self.inner.lock() {
            inner.step = step;
            inner.label = label;
        }
        self.publish_ratio(0.0);
    }

    /// Change the phase label without advancing
    pub fn set_label(&self, label: impl Into<String>) {
        let label = label.into();
        let ratio = match self.inner.lock() {
            Ok(mut inner) => {
                inner.label = label.clone();
                inner.ratio
            }
            Err(_) => return,
        };
        self.notify(JobEvent::Progress { ratio, label });
    }

    /// Mark the job complete at ratio 1
    pub fn finish(&self, label: impl Into<String>) {
        let label = label.into();
        if let Ok(mut inner) = self.inner.lock() {
            inner.ratio = 1.0;
            inner.label = label.clone();
        }
        self.notify(JobEvent::Progress { ratio: 1.0, label });
    }

    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        if let Ok(mut inner) = self.inner.lock() {
            inner.log.push_line(&line);
        }
        self.notify(JobEvent::Log(line));
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        if let Ok(mut inner) = self.inner.lock() {
            inner.log.push_line(&message);
        }
        self.notify(JobEvent::Warning(message));
    }

    pub fn fail(&self, error: &MergeError) {
        self.set_state(JobState::Failed);
        if let Ok(mut inner) = self.inner.lock() {
            inner.label = "Error occurred".to_string();
        }
        self.notify(JobEvent::Failed {
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        self.inner.lock().ok().map(|inner| ProgressSnapshot {
            state: inner.state,
            ratio: inner.ratio,
            label: inner.label.clone(),
        })
    }

    pub fn log_text(&self) -> String {
        self.inner
            .lock()
            .map(|inner| inner.log.as_str().to_string())
            .unwrap_or_default()
    }

    /// Fold a step-local ratio into the overall ratio, never moving backwards
    fn publish_ratio(&self, step_ratio: f64) {
        let step_ratio = if step_ratio.is_finite() {
            step_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (ratio, label) = match self.inner.lock() {
            Ok(mut inner) => {
                let overall = (inner.step as f64 + step_ratio) / inner.total_steps as f64;
                inner.ratio = inner.ratio.max(overall.min(1.0));
                (inner.ratio, inner.label.clone())
            }
            Err(_) => return,
        };
        self.notify(JobEvent::Progress { ratio, label });
    }

    fn notify(&self, event: JobEvent) {
        trace!(?event, "job event");
        let observers = match self.observers.lock() {
            Ok(observers) => observers.clone(),
            Err(_) => return,
        };
        for observer in observers {
            observer.on_event(&event);
        }
    }
}

impl EngineEventSink for ProgressReporter {
    fn on_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Log(line) => self.log(line),
            EngineEvent::Progress(ratio) => self.publish_ratio(ratio),
        }
    }
}
