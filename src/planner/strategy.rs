//! Concatenation strategy selection

use serde::Serialize;

use crate::domain::model::MergeMode;

/// One way of running the final concatenation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcatAttempt {
    /// Stream copy (fast, needs uniform inputs)
    Copy,
    /// Full re-encode (slow, compatible)
    Reencode,
}

/// Ordered list of concatenation attempts; later entries are fallbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcatPolicy {
    attempts: Vec<ConcatAttempt>,
}

impl ConcatPolicy {
    /// Pick the attempts for a job.
    ///
    /// Intermediates produced by per-clip passes are already uniform, so a
    /// copy is used for them even when the user asked to re-encode.
    pub fn select(per_clip_processed: bool, mode: MergeMode) -> Self {
        let attempts = if per_clip_processed {
            vec![ConcatAttempt::Copy]
        } else {
            match mode {
                MergeMode::Copy => vec![ConcatAttempt::Copy, ConcatAttempt::Reencode],
                MergeMode::Reencode => vec![ConcatAttempt::Reencode],
            }
        };
        Self { attempts }
    }

    pub fn attempts(&self) -> &[ConcatAttempt] {
        &self.attempts
    }

    pub fn has_fallback(&self) -> bool {
        self.attempts.len() > 1
    }
}
