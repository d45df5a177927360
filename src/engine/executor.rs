//! Runs a [`JobPlan`] against the engine, one operation at a time

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::engine::progress::ProgressReporter;
use crate::error::{EngineError, MergeError, MergeResult};
use crate::planner::{ConcatAttempt, EngineOp, JobPlan};
use crate::ports::EnginePort;

/// Executes merge plans.
///
/// Every engine call is awaited before the next one is issued; the engine
/// filesystem is shared and unsynchronized.
pub struct MergeExecutor<'a> {
    engine: &'a dyn EnginePort,
    reporter: &'a ProgressReporter,
}

impl<'a> MergeExecutor<'a> {
    pub fn new(engine: &'a dyn EnginePort, reporter: &'a ProgressReporter) -> Self {
        Self { engine, reporter }
    }

    /// Run the plan and return the final artifact; scratch files are removed
    /// afterwards whether or not the job succeeded.
    pub async fn execute(
        &self,
        plan: &JobPlan,
        files: &OrderedFileSet,
        cover: Option<&CoverArt>,
        file_name: String,
    ) -> MergeResult<MergeOutput> {
        let started = Instant::now();
        let result = self.run(plan, files, cover, file_name).await;
        self.cleanup(plan).await;
        if result.is_ok() {
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "merge job finished"
            );
        }
        result
    }

    async fn run(
        &self,
        plan: &JobPlan,
        files: &OrderedFileSet,
        cover: Option<&CoverArt>,
        file_name: String,
    ) -> MergeResult<MergeOutput> {
        let total_steps =
            plan.clip_ops.len() + 1 + usize::from(plan.cover_op.is_some());
        self.reporter.set_total_steps(total_steps);

        // 1. Stage inputs in merge order
        self.reporter.set_state(JobState::Staging);
        self.reporter.set_label("Preparing input files...");
        for (input, entry) in plan.inputs.iter().zip(files.entries()) {
            debug!(name = %input.name, source = %entry.file.name, bytes = entry.file.len(), "staging input");
            self.engine.write_file(&input.name, entry.file.bytes()).await?;
        }

        // 2. Per-clip trims and fades
        let mut step = 0;
        if plan.needs_per_clip_processing {
            self.reporter.set_state(JobState::ProcessingClips);
            let count = plan.clip_ops.len();
            for (i, op) in plan.clip_ops.iter().enumerate() {
                self.reporter
                    .begin_step(step, format!("Processing clip {}/{}...", i + 1, count));
                self.run_op(op).await.map_err(|e| MergeError::ClipProcessing {
                    index: i + 1,
                    message: e.to_string(),
                })?;
                step += 1;
            }
        }

        // 3. Manifest
        self.engine
            .write_file(&plan.manifest_name, plan.manifest.as_bytes())
            .await?;

        // 4. Concatenation with the plan's fallback policy
        self.reporter.set_state(JobState::Concatenating);
        self.concatenate(plan, step).await?;
        step += 1;

        // 5. Cover art
        if let Some(op) = &plan.cover_op {
            self.reporter.set_state(JobState::EmbeddingCover);
            self.reporter.begin_step(step, "Embedding cover art...");
            let (Some(cover_name), Some(cover)) = (plan.cover_input.as_deref(), cover) else {
                return Err(MergeError::CoverEmbed {
                    message: "cover image missing".to_string(),
                });
            };
            self.engine
                .write_file(cover_name, cover.bytes())
                .await
                .map_err(|e| MergeError::CoverEmbed {
                    message: e.to_string(),
                })?;
            self.run_op(op).await.map_err(|e| MergeError::CoverEmbed {
                message: e.to_string(),
            })?;
        }

        // 6. Extract
        self.reporter.set_state(JobState::Extracting);
        self.reporter.set_label("Generating output file...");
        let bytes = self.engine.read_file(plan.final_output()).await?;
        info!(output = plan.final_output(), bytes = bytes.len(), "read merged artifact");

        Ok(MergeOutput {
            bytes,
            mime: plan.kind.output_mime(),
            file_name,
        })
    }

    async fn concatenate(&self, plan: &JobPlan, step: usize) -> MergeResult<()> {
        let attempts = plan.concat.attempts();
        for (n, attempt) in attempts.iter().enumerate() {
            let label = match (attempt, n) {
                (ConcatAttempt::Reencode, n) if n > 0 => "Merging (re-encoding)...",
                _ => "Merging...",
            };
            self.reporter.begin_step(step, label);
            match self.run_op(plan.concat_op(*attempt)).await {
                Ok(()) => {
                    info!(?attempt, "concatenation succeeded");
                    return Ok(());
                }
                Err(e) if n + 1 < attempts.len() => {
                    warn!(?attempt, error = %e, "concatenation failed, retrying with fallback");
                    self.reporter
                        .warn(format!("-c copy failed ({}), retrying with re-encode.", e));
                }
                Err(e) => {
                    return Err(MergeError::Concatenation {
                        message: e.to_string(),
                    })
                }
            }
        }
        Err(MergeError::Concatenation {
            message: "no concatenation attempt configured".to_string(),
        })
    }

    async fn run_op(&self, op: &EngineOp) -> Result<(), EngineError> {
        debug!(args = ?op.args, "exec");
        let code = self.engine.exec(&op.args, self.reporter).await?;
        if code != 0 {
            return Err(EngineError::ExitCode { code });
        }
        Ok(())
    }

    async fn cleanup(&self, plan: &JobPlan) {
        for name in plan.scratch_files() {
            if let Err(e) = self.engine.delete_file(&name).await {
                debug!(name = %name, error = %e, "could not remove scratch file");
            }
        }
    }
}
