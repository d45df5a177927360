use std::sync::Arc;

use crate::adapters::{FfmpegProcessFactory, TracingLogObserver};
use crate::app::merge_interactor::MergeInteractor;
use crate::config_initialization::MergeConfig;
use crate::engine::{EngineSession, ProgressReporter};
use crate::planner::{ClipPlanBuilder, CodecProfile};
use crate::ports::{EngineFactory, EngineLoadConfig};

pub trait AppContainer: Send + Sync {
    fn merge_interactor(&self) -> Arc<MergeInteractor>;
}

pub struct DefaultAppContainer {
    merge_interactor: Arc<MergeInteractor>,
}

impl DefaultAppContainer {
    /// Wire the process-backed ffmpeg engine
    pub fn new(config: &MergeConfig) -> Self {
        Self::with_factory(config, Arc::new(FfmpegProcessFactory))
    }

    /// Wire an arbitrary engine factory
    pub fn with_factory(config: &MergeConfig, factory: Arc<dyn EngineFactory>) -> Self {
        let load_config = EngineLoadConfig {
            binary: config.ffmpeg_binary.clone(),
        };
        let session = Arc::new(
            EngineSession::new(factory, load_config).with_ready_timeout(config.ready_timeout()),
        );
        let planner =
            ClipPlanBuilder::new(CodecProfile::default().with_audio_bitrate(&config.audio_bitrate));

        let reporter = ProgressReporter::new(config.log_capacity);
        reporter.add_observer(Arc::new(TracingLogObserver::new()));

        Self {
            merge_interactor: Arc::new(MergeInteractor::new(session, planner, reporter)),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn merge_interactor(&self) -> Arc<MergeInteractor> {
        Arc::clone(&self.merge_interactor)
    }
}
