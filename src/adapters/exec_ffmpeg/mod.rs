//! FFmpeg execution adapter
//!
//! Drives a system `ffmpeg` binary. A private temporary directory plays the
//! role of the engine filesystem, and stderr is streamed back as log lines
//! with progress derived from the `Duration:` and `time=` stamps.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::ports::{EngineEvent, EngineEventSink, EngineFactory, EngineLoadConfig, EnginePort};
use crate::utils::parse_time;

/// Arguments prepended to every invocation
const BASE_ARGS: [&str; 3] = ["-hide_banner", "-nostdin", "-y"];

/// ffmpeg process-backed engine
pub struct FfmpegProcessEngine {
    workdir: OnceLock<TempDir>,
    binary: Mutex<String>,
}

impl FfmpegProcessEngine {
    pub fn new() -> Self {
        Self {
            workdir: OnceLock::new(),
            binary: Mutex::new("ffmpeg".to_string()),
        }
    }

    fn binary(&self) -> String {
        self.binary
            .lock()
            .map(|b| b.clone())
            .unwrap_or_else(|_| "ffmpeg".to_string())
    }

    fn workdir(&self) -> Result<&TempDir, EngineError> {
        self.workdir.get().ok_or_else(|| EngineError::Load {
            message: "engine not loaded".to_string(),
        })
    }

    /// Resolve a plain file name inside the working directory
    fn path_for(&self, name: &str) -> Result<PathBuf, EngineError> {
        if !is_plain_name(name) {
            return Err(EngineError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.workdir()?.path().join(name))
    }
}

impl Default for FfmpegProcessEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnginePort for FfmpegProcessEngine {
    async fn load(&self, config: &EngineLoadConfig) -> Result<(), EngineError> {
        let output = Command::new(&config.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| EngineError::Load {
                message: format!("cannot run {}: {}", config.binary, e),
            })?;
        if !output.status.success() {
            return Err(EngineError::Load {
                message: format!("{} -version exited with {}", config.binary, output.status),
            });
        }
        let version = String::from_utf8_lossy(&output.stdout);
        info!(version = version.lines().next().unwrap_or_default(), "ffmpeg available");

        if self.workdir.get().is_none() {
            let dir = tempfile::Builder::new().prefix("clipmerge-").tempdir()?;
            debug!(path = %dir.path().display(), "engine workspace created");
            let _ = self.workdir.set(dir);
        }
        if let Ok(mut binary) = self.binary.lock() {
            *binary = config.binary.clone();
        }
        Ok(())
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), EngineError> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(EngineError::FileNotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exec(
        &self,
        args: &[String],
        events: &dyn EngineEventSink,
    ) -> Result<i32, EngineError> {
        let workdir = self.workdir()?.path().to_path_buf();
        let mut child = Command::new(self.binary())
            .args(BASE_ARGS)
            .args(args)
            .current_dir(&workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Exec {
                message: e.to_string(),
            })?;

        let mut tracker = StderrTracker::default();
        if let Some(mut stderr) = child.stderr.take() {
            let mut buf = [0u8; 4096];
            loop {
                let n = stderr.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                for event in tracker.feed(&buf[..n]) {
                    events.on_engine_event(event);
                }
            }
            for event in tracker.flush() {
                events.on_engine_event(event);
            }
        }

        let status = child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Creates process engines for the session manager
pub struct FfmpegProcessFactory;

impl EngineFactory for FfmpegProcessFactory {
    fn create(&self) -> Arc<dyn EnginePort> {
        Arc::new(FfmpegProcessEngine::new())
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

/// Splits ffmpeg stderr into lines (`\n` or `\r`) and derives progress
#[derive(Default)]
struct StderrTracker {
    pending: Vec<u8>,
    duration: Option<f64>,
}

impl StderrTracker {
    fn feed(&mut self, chunk: &[u8]) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                let line = String::from_utf8_lossy(&self.pending).trim().to_string();
                self.pending.clear();
                self.handle_line(line, &mut events);
            } else {
                self.pending.push(byte);
            }
        }
        events
    }

    fn flush(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let line = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        self.handle_line(line, &mut events);
        events
    }

    fn handle_line(&mut self, line: String, events: &mut Vec<EngineEvent>) {
        if line.is_empty() {
            return;
        }
        if self.duration.is_none() {
            self.duration = parse_duration_line(&line).filter(|d| *d > 0.0);
        }
        let progress = match (self.duration, parse_time_stamp(&line)) {
            (Some(total), Some(done)) => Some(done / total),
            _ => None,
        };
        events.push(EngineEvent::Log(line));
        if let Some(ratio) = progress {
            events.push(EngineEvent::Progress(ratio));
        }
    }
}

/// `Duration: 00:01:02.50, start: ...` → 62.5
fn parse_duration_line(line: &str) -> Option<f64> {
    let rest = line.trim_start().strip_prefix("Duration:")?;
    let stamp = rest.split(',').next()?.trim();
    parse_time(stamp).ok()
}

/// `... time=00:00:05.12 bitrate=...` → 5.12
fn parse_time_stamp(line: &str) -> Option<f64> {
    let start = line.find("time=")? + "time=".len();
    let stamp = line[start..].split_whitespace().next()?;
    parse_time(stamp).ok()
}
