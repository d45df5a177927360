// Ports - Interface definitions (contracts)

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::model::JobState;
use crate::error::{EngineError, ErrorKind};

/// Settings handed to [`EnginePort::load`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineLoadConfig {
    /// Engine binary or core location
    pub binary: String,
}

impl Default for EngineLoadConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }
}

/// Raw event emitted by the engine while an operation runs
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// One line of engine log output
    Log(String),
    /// Completion ratio of the current operation, not necessarily in [0, 1]
    Progress(f64),
}

/// Receiver of engine events for the operation in flight
pub trait EngineEventSink: Send + Sync {
    fn on_engine_event(&self, event: EngineEvent);
}

/// Port for the media-processing engine and its private filesystem.
///
/// The handle is not synchronized; callers must await each call before
/// issuing the next one.
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Prepare the engine for use
    async fn load(&self, config: &EngineLoadConfig) -> Result<(), EngineError>;

    /// Store bytes under a plain file name
    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), EngineError>;

    /// Read a file back out
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError>;

    /// Remove a file; missing files are not an error
    async fn delete_file(&self, name: &str) -> Result<(), EngineError>;

    /// Run one command-line style operation and return its exit code
    async fn exec(&self, args: &[String], events: &dyn EngineEventSink)
        -> Result<i32, EngineError>;
}

/// Creates fresh, unloaded engine instances for the session manager
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Arc<dyn EnginePort>;
}

/// Event published to job observers
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    StateChanged(JobState),
    Progress { ratio: f64, label: String },
    Log(String),
    Warning(String),
    Failed { kind: ErrorKind, message: String },
}

/// Port for anything that watches a merge job (UI, logs, tests)
pub trait JobObserver: Send + Sync {
    fn on_event(&self, event: &JobEvent);
}
