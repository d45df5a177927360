// Merge interactor - Orchestrates one merge job end to end

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::domain::model::*;
use crate::domain::rules::InputValidator;
use crate::engine::{EngineSession, MergeExecutor, ProgressReporter};
use crate::error::{MergeError, MergeResult};
use crate::planner::{ClipPlanBuilder, JobPlan};

/// Everything the caller supplies for one merge
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub kind: MediaKind,
    pub mode: MergeMode,
    pub files: OrderedFileSet,
    pub cover: Option<CoverArt>,
    pub output_name: String,
}

impl MergeRequest {
    pub fn new(kind: MediaKind, mode: MergeMode, files: OrderedFileSet) -> Self {
        Self {
            kind,
            mode,
            files,
            cover: None,
            output_name: String::new(),
        }
    }

    pub fn with_cover(mut self, cover: CoverArt) -> Self {
        self.cover = Some(cover);
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Cover art only applies to audio merges
    fn effective_cover(&self) -> Option<&CoverArt> {
        match self.kind {
            MediaKind::Audio => self.cover.as_ref(),
            MediaKind::Video => None,
        }
    }
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Interactor for the merge use case; runs at most one job at a time
pub struct MergeInteractor {
    session: Arc<EngineSession>,
    planner: ClipPlanBuilder,
    reporter: ProgressReporter,
    running: AtomicBool,
    last_output: Mutex<Option<Arc<MergeOutput>>>,
}

impl MergeInteractor {
    /// Create new merge interactor with injected collaborators
    pub fn new(
        session: Arc<EngineSession>,
        planner: ClipPlanBuilder,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            session,
            planner,
            reporter,
            running: AtomicBool::new(false),
            last_output: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &EngineSession {
        &self.session
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    pub fn state(&self) -> JobState {
        self.reporter.state()
    }

    /// True while a job is between `Validating` and a terminal state;
    /// callers should not offer a new merge
    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    pub fn last_output(&self) -> Option<Arc<MergeOutput>> {
        self.last_output.lock().ok().and_then(|o| o.clone())
    }

    /// Drop the previous artifact
    pub fn release_output(&self) {
        if let Ok(mut output) = self.last_output.lock() {
            if output.take().is_some() {
                info!("released previous merge output");
            }
        }
    }

    /// Validate and plan without touching the engine
    pub fn plan(&self, request: &MergeRequest) -> MergeResult<JobPlan> {
        InputValidator::validate_request(&request.files, request.kind)?;
        Ok(self.planner.build(
            &request.files,
            request.kind,
            request.mode,
            request.effective_cover(),
        ))
    }

    /// Execute a merge job
    pub async fn merge(&self, request: &MergeRequest) -> MergeResult<Arc<MergeOutput>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(MergeError::Busy);
        }
        let _guard = RunGuard(&self.running);

        // Rejected requests leave job state and the prior artifact untouched
        if let Err(e) = InputValidator::validate_request(&request.files, request.kind) {
            info!(error = %e, "merge request rejected");
            return Err(e);
        }

        match self.run_job(request).await {
            Ok(output) => Ok(output),
            Err(e) => {
                error!(kind = ?e.kind(), error = %e, "merge job failed");
                self.reporter.fail(&e);
                Err(e)
            }
        }
    }

    async fn run_job(&self, request: &MergeRequest) -> MergeResult<Arc<MergeOutput>> {
        self.reporter.set_state(JobState::Validating);
        let plan = self.planner.build(
            &request.files,
            request.kind,
            request.mode,
            request.effective_cover(),
        );

        // Inputs are good: start from a clean slate
        self.release_output();
        self.reporter.reset();
        if request.kind == MediaKind::Video && request.cover.is_some() {
            self.reporter
                .warn("Cover art applies to audio merges only; ignoring it.");
        }
        info!(
            kind = %request.kind,
            mode = ?request.mode,
            files = request.files.len(),
            per_clip = plan.needs_per_clip_processing,
            "starting merge job"
        );

        if !self.session.is_ready() {
            self.reporter.set_label("Checking engine loading...");
        }
        let engine = self.session.acquire().await?;

        let executor = MergeExecutor::new(engine.as_ref(), &self.reporter);
        let output = executor
            .execute(
                &plan,
                &request.files,
                request.effective_cover(),
                output_file_name(&request.output_name, request.kind),
            )
            .await?;

        let output = Arc::new(output);
        if let Ok(mut last) = self.last_output.lock() {
            *last = Some(Arc::clone(&output));
        }
        self.reporter.set_state(JobState::Done);
        self.reporter.finish("Done!");
        info!(file = %output.file_name, bytes = output.bytes.len(), "merge complete");
        Ok(output)
    }
}
