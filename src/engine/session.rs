//! Lazily loaded, memoized engine handle

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::{MergeError, MergeResult};
use crate::ports::{EngineFactory, EngineLoadConfig, EnginePort};

/// Default bound on waiting for the engine to become ready
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(20);

/// Owns the single engine handle for a process.
///
/// Concurrent `ensure_ready` calls share one in-flight load. A failed load
/// leaves the session empty so the next call starts over.
pub struct EngineSession {
    factory: Arc<dyn EngineFactory>,
    load_config: EngineLoadConfig,
    ready_timeout: Duration,
    handle: OnceCell<Arc<dyn EnginePort>>,
}

impl EngineSession {
    pub fn new(factory: Arc<dyn EngineFactory>, load_config: EngineLoadConfig) -> Self {
        Self {
            factory,
            load_config,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            handle: OnceCell::new(),
        }
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn ready_timeout(&self) -> Duration {
        self.ready_timeout
    }

    /// True once a load has succeeded
    pub fn is_ready(&self) -> bool {
        self.handle.initialized()
    }

    /// Load the engine on first use and return the shared handle
    pub async fn ensure_ready(&self) -> MergeResult<Arc<dyn EnginePort>> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                info!(binary = %self.load_config.binary, "loading media engine");
                let engine = self.factory.create();
                match engine.load(&self.load_config).await {
                    Ok(()) => {
                        info!("media engine ready");
                        Ok(engine)
                    }
                    Err(e) => {
                        warn!(error = %e, "media engine failed to load");
                        Err(MergeError::EngineUnavailable {
                            message: e.to_string(),
                        })
                    }
                }
            })
            .await?;
        Ok(Arc::clone(handle))
    }

    /// Wait for readiness, giving up after the configured timeout
    pub async fn acquire(&self) -> MergeResult<Arc<dyn EnginePort>> {
        match tokio::time::timeout(self.ready_timeout, self.ensure_ready()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.ready_timeout.as_millis() as u64, "engine load timed out");
                Err(MergeError::EngineUnavailable {
                    message: format!(
                        "engine load timed out after {:.1}s",
                        self.ready_timeout.as_secs_f64()
                    ),
                })
            }
        }
    }
}
