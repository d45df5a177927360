//! ClipMerge Library
//!
//! Merge orchestration for audio and video clips: input validation, per-clip
//! trim and fade planning, concatenation with a copy-then-re-encode fallback,
//! optional cover art, and progress reporting over a pluggable engine port.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{MergeInteractor, MergeRequest, MergeWorkspace};
pub use domain::model::{
    ClipSetting, CoverArt, JobState, MediaKind, MergeMode, MergeOutput, OrderedFileSet, SourceFile,
};
pub use error::{EngineError, ErrorKind, MergeError, MergeResult};
pub use planner::{ClipPlanBuilder, JobPlan};
