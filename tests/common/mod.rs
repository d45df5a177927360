//! Shared test doubles: an in-memory scripted engine and a recording observer

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use clipmerge::engine::{EngineSession, ProgressReporter, DEFAULT_LOG_CAPACITY};
use clipmerge::error::EngineError;
use clipmerge::planner::ClipPlanBuilder;
use clipmerge::ports::{
    EngineEvent, EngineEventSink, EngineFactory, EngineLoadConfig, EnginePort, JobEvent,
    JobObserver,
};
use clipmerge::{MergeInteractor, OrderedFileSet, SourceFile};

type FailRule = Box<dyn Fn(&[String]) -> bool + Send + Sync>;

/// Engine double that keeps files in memory and records every exec call.
///
/// Exec writes `"<output>"` as the contents of its last argument unless a
/// failure rule matches, in which case it returns exit code 1.
#[derive(Default)]
pub struct ScriptedEngine {
    files: Mutex<HashMap<String, Vec<u8>>>,
    execs: Mutex<Vec<Vec<String>>>,
    deleted: Mutex<Vec<String>>,
    fail_rules: Mutex<Vec<FailRule>>,
    pub loads: AtomicUsize,
    load_failures: AtomicUsize,
    load_delay: Mutex<Option<Duration>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Return exit code 1 for any exec whose args match
    pub fn fail_when(&self, rule: impl Fn(&[String]) -> bool + Send + Sync + 'static) {
        self.fail_rules.lock().unwrap().push(Box::new(rule));
    }

    /// The next `count` loads fail
    pub fn fail_loads(&self, count: usize) {
        self.load_failures.store(count, Ordering::SeqCst);
    }

    pub fn delay_loads(&self, delay: Duration) {
        *self.load_delay.lock().unwrap() = Some(delay);
    }

    pub fn execs(&self) -> Vec<Vec<String>> {
        self.execs.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnginePort for ScriptedEngine {
    async fn load(&self, _config: &EngineLoadConfig) -> Result<(), EngineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let delay = *self.load_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let remaining = self.load_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.load_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(EngineError::Load {
                message: "core download failed".to_string(),
            });
        }
        Ok(())
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), EngineError> {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        self.file(name).ok_or_else(|| EngineError::FileNotFound {
            name: name.to_string(),
        })
    }

    async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
        self.files.lock().unwrap().remove(name);
        self.deleted.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn exec(
        &self,
        args: &[String],
        events: &dyn EngineEventSink,
    ) -> Result<i32, EngineError> {
        self.execs.lock().unwrap().push(args.to_vec());
        events.on_engine_event(EngineEvent::Log(format!("exec {}", args.join(" "))));

        let fails = self.fail_rules.lock().unwrap().iter().any(|rule| rule(args));
        if fails {
            events.on_engine_event(EngineEvent::Log("Conversion failed!".to_string()));
            return Ok(1);
        }

        events.on_engine_event(EngineEvent::Progress(0.5));
        events.on_engine_event(EngineEvent::Progress(1.0));
        if let Some(output) = args.last() {
            self.write_file(output, output.as_bytes()).await?;
        }
        Ok(0)
    }
}

/// Hands out the same scripted engine and counts creations
pub struct ScriptedFactory {
    engine: Arc<ScriptedEngine>,
    pub created: AtomicUsize,
}

impl ScriptedFactory {
    pub fn new(engine: Arc<ScriptedEngine>) -> Arc<Self> {
        Arc::new(Self {
            engine,
            created: AtomicUsize::new(0),
        })
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self) -> Arc<dyn EnginePort> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Arc::clone(&self.engine) as Arc<dyn EnginePort>
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<JobEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<JobEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                JobEvent::Warning(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    pub fn ratios(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                JobEvent::Progress { ratio, .. } => Some(ratio),
                _ => None,
            })
            .collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                JobEvent::Progress { label, .. } => Some(label),
                _ => None,
            })
            .collect()
    }
}

impl JobObserver for RecordingObserver {
    fn on_event(&self, event: &JobEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn session_for(engine: &Arc<ScriptedEngine>) -> Arc<EngineSession> {
    Arc::new(EngineSession::new(
        ScriptedFactory::new(Arc::clone(engine)),
        EngineLoadConfig::default(),
    ))
}

pub fn interactor_for(engine: &Arc<ScriptedEngine>) -> (MergeInteractor, Arc<RecordingObserver>) {
    let reporter = ProgressReporter::new(DEFAULT_LOG_CAPACITY);
    let observer = Arc::new(RecordingObserver::default());
    reporter.add_observer(Arc::clone(&observer) as Arc<dyn JobObserver>);
    let interactor = MergeInteractor::new(session_for(engine), ClipPlanBuilder::default(), reporter);
    (interactor, observer)
}

pub fn files(names: &[&str]) -> OrderedFileSet {
    OrderedFileSet::from_files(names.iter().map(|n| SourceFile::new(*n, None, vec![7; 16])))
}

/// True when the args describe a `-c copy` concatenation
pub fn is_copy_concat(args: &[String]) -> bool {
    args.iter().any(|a| a == "concat") && args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy")
}

pub fn is_reencode_concat(args: &[String]) -> bool {
    args.iter().any(|a| a == "concat") && !is_copy_concat(args)
}

pub fn is_clip_op(args: &[String]) -> bool {
    args.last().map(|o| o.starts_with("clip_")).unwrap_or(false)
}
