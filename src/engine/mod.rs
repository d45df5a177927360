//! Engine session, plan execution and progress reporting

pub mod executor;
pub mod progress;
pub mod session;

pub use executor::MergeExecutor;
pub use progress::{LogBuffer, ProgressReporter, ProgressSnapshot, DEFAULT_LOG_CAPACITY};
pub use session::{EngineSession, DEFAULT_READY_TIMEOUT};
