// Domain models - Core types and data structures

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MergeError;

/// Kind of media being merged; fixed for the lifetime of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Audio,
    Video,
}

impl MediaKind {
    /// Parse media kind from string
    pub fn parse(kind_str: &str) -> Result<Self, MergeError> {
        match kind_str.trim().to_lowercase().as_str() {
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            other => Err(MergeError::validation(format!(
                "Invalid media kind: {}. Valid kinds: audio, video",
                other
            ))),
        }
    }

    /// Extension of merged and intermediate outputs
    pub fn output_extension(&self) -> &'static str {
        match self {
            MediaKind::Audio => "mp3",
            MediaKind::Video => "mp4",
        }
    }

    /// MIME type of the final artifact
    pub fn output_mime(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio/mpeg",
            MediaKind::Video => "video/mp4",
        }
    }

    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio/",
            MediaKind::Video => "video/",
        }
    }

    /// Filename extensions accepted regardless of MIME type
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Audio => &["mp3", "m4a", "wav"],
            MediaKind::Video => &["mp4", "mov"],
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// User intent for the final concatenation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    #[default]
    Copy,
    Reencode,
}

impl MergeMode {
    /// Parse merge mode from string
    pub fn parse(mode_str: &str) -> Result<Self, MergeError> {
        match mode_str.trim().to_lowercase().as_str() {
            "copy" => Ok(MergeMode::Copy),
            "reencode" | "re-encode" => Ok(MergeMode::Reencode),
            other => Err(MergeError::validation(format!(
                "Invalid merge mode: {}. Valid modes: copy, reencode",
                other
            ))),
        }
    }
}

/// Caller-owned media file; the engine only borrows its bytes for staging
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub mime: Option<String>,
    data: Arc<Vec<u8>>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            data: Arc::new(data),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lowercased extension of the display name, if any
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

/// Per-file trim and fade settings, all in seconds. `end == 0` means unset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipSetting {
    pub start: f64,
    pub end: f64,
    pub fade_in: f64,
    pub fade_out: f64,
}

impl ClipSetting {
    pub fn new(start: f64, end: f64, fade_in: f64, fade_out: f64) -> Self {
        Self {
            start,
            end,
            fade_in,
            fade_out,
        }
    }

    /// True when any trim or fade is requested
    pub fn has_edits(&self) -> bool {
        self.start > 0.0 || self.end > 0.0 || self.fade_in > 0.0 || self.fade_out > 0.0
    }

    /// Clip length, only known when an end time is set
    pub fn duration(&self) -> Option<f64> {
        (self.end > 0.0).then(|| self.end - self.start)
    }
}

/// Partial update for a [`ClipSetting`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipSettingPatch {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
}

/// One entry of the ordered file set
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub file: SourceFile,
    pub setting: ClipSetting,
}

/// Ordered (file, setting) pairs; order is the merge order
#[derive(Debug, Clone, Default)]
pub struct OrderedFileSet {
    entries: Vec<FileEntry>,
}

impl OrderedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from files, each paired with a default setting
    pub fn from_files(files: impl IntoIterator<Item = SourceFile>) -> Self {
        let mut set = Self::new();
        for file in files {
            set.push(file);
        }
        set
    }

    pub fn push(&mut self, file: SourceFile) {
        self.entries.push(FileEntry {
            file,
            setting: ClipSetting::default(),
        });
    }

    /// Remove a file together with its setting
    pub fn remove(&mut self, index: usize) -> Option<FileEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Move a file (and its setting) from one position to another
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    pub fn update_setting(&mut self, index: usize, patch: ClipSettingPatch) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        let setting = &mut entry.setting;
        if let Some(start) = patch.start {
            setting.start = start;
        }
        if let Some(end) = patch.end {
            setting.end = end;
        }
        if let Some(fade_in) = patch.fade_in {
            setting.fade_in = fade_in;
        }
        if let Some(fade_out) = patch.fade_out {
            setting.fade_out = fade_out;
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.entries.iter().map(|e| &e.file)
    }

    pub fn settings(&self) -> impl Iterator<Item = &ClipSetting> {
        self.entries.iter().map(|e| &e.setting)
    }
}

/// Compressed cover image, embedded into audio outputs only
#[derive(Debug, Clone)]
pub struct CoverArt {
    pub mime: String,
    data: Arc<Vec<u8>>,
}

impl CoverArt {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data: Arc::new(data),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Extension used when staging the image
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

/// Lifecycle of a merge job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Validating,
    Staging,
    ProcessingClips,
    Concatenating,
    EmbeddingCover,
    Extracting,
    Done,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }

    /// A job is running; new merge requests must be refused
    pub fn is_busy(&self) -> bool {
        !matches!(self, JobState::Idle) && !self.is_terminal()
    }
}

/// Final downloadable artifact
#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

/// Suggested download name: `<name or "merged">.<mp3|mp4>`
pub fn output_file_name(output_name: &str, kind: MediaKind) -> String {
    let trimmed = output_name.trim();
    let stem = if trimmed.is_empty() { "merged" } else { trimmed };
    format!("{}.{}", stem, kind.output_extension())
}
