//! Caller-side merge inputs: kind, files, cover and the last artifact

use std::sync::Arc;

use crate::app::merge_interactor::MergeRequest;
use crate::domain::model::*;
use crate::domain::rules::{InputValidator, Selection};
use crate::error::{MergeError, MergeResult};

/// Holds the inputs a host edits between merges.
///
/// Any change to kind, files or cover releases the previous artifact.
#[derive(Debug, Default)]
pub struct MergeWorkspace {
    kind: MediaKind,
    mode: MergeMode,
    files: OrderedFileSet,
    cover: Option<CoverArt>,
    output_name: String,
    output: Option<Arc<MergeOutput>>,
}

impl MergeWorkspace {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn files(&self) -> &OrderedFileSet {
        &self.files
    }

    pub fn cover(&self) -> Option<&CoverArt> {
        self.cover.as_ref()
    }

    pub fn output(&self) -> Option<&Arc<MergeOutput>> {
        self.output.as_ref()
    }

    /// Switching kind drops files, cover and artifact
    pub fn set_kind(&mut self, kind: MediaKind) {
        if kind != self.kind {
            self.kind = kind;
            self.files.clear();
            self.cover = None;
            self.output = None;
        }
    }

    pub fn set_mode(&mut self, mode: MergeMode) {
        self.mode = mode;
    }

    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.output_name = name.into();
    }

    /// Suggested download name for the current settings
    pub fn file_name(&self) -> String {
        output_file_name(&self.output_name, self.kind)
    }

    /// Replace the file list with a new selection; returns a non-fatal warning
    /// when some files were dropped
    pub fn select_files(&mut self, incoming: Vec<SourceFile>) -> MergeResult<Option<String>> {
        match InputValidator::accept_selection(incoming, self.kind)? {
            Selection::Ignored => Ok(None),
            Selection::Accepted { files, warning } => {
                self.files = files;
                self.output = None;
                Ok(warning)
            }
        }
    }

    pub fn remove_file(&mut self, index: usize) -> bool {
        let removed = self.files.remove(index).is_some();
        if removed {
            self.output = None;
        }
        removed
    }

    pub fn move_file(&mut self, from: usize, to: usize) -> bool {
        let moved = self.files.move_entry(from, to);
        if moved && from != to {
            self.output = None;
        }
        moved
    }

    pub fn update_setting(&mut self, index: usize, patch: ClipSettingPatch) -> bool {
        let updated = self.files.update_setting(index, patch);
        if updated {
            self.output = None;
        }
        updated
    }

    pub fn set_cover(&mut self, cover: CoverArt) -> MergeResult<()> {
        if self.kind != MediaKind::Audio {
            return Err(MergeError::validation(
                "Cover art is only supported for audio merges.",
            ));
        }
        self.cover = Some(cover);
        self.output = None;
        Ok(())
    }

    pub fn clear_cover(&mut self) {
        if self.cover.take().is_some() {
            self.output = None;
        }
    }

    /// Snapshot of the current inputs as a merge request
    pub fn request(&self) -> MergeRequest {
        MergeRequest {
            kind: self.kind,
            mode: self.mode,
            files: self.files.clone(),
            cover: self.cover.clone(),
            output_name: self.output_name.clone(),
        }
    }

    pub fn set_output(&mut self, output: Arc<MergeOutput>) {
        self.output = Some(output);
    }

    /// Back to an empty workspace of the same kind
    pub fn reset(&mut self) {
        self.files.clear();
        self.cover = None;
        self.output = None;
        self.output_name.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(name: &str) -> SourceFile {
        SourceFile::new(name, Some("audio/mpeg".to_string()), vec![1])
    }

    fn artifact() -> Arc<MergeOutput> {
        Arc::new(MergeOutput {
            bytes: vec![9],
            mime: "audio/mpeg",
            file_name: "merged.mp3".to_string(),
        })
    }

    #[test]
    fn test_kind_change_clears_files_and_cover() {
        let mut ws = MergeWorkspace::new(MediaKind::Audio);
        ws.select_files(vec![audio("a.mp3"), audio("b.mp3")]).unwrap();
        ws.set_cover(CoverArt::new("image/png", vec![1])).unwrap();
        ws.set_output(artifact());

        ws.set_kind(MediaKind::Video);
        assert!(ws.files().is_empty());
        assert!(ws.cover().is_none());
        assert!(ws.output().is_none());
    }

    #[test]
    fn test_same_kind_keeps_files() {
        let mut ws = MergeWorkspace::new(MediaKind::Audio);
        ws.select_files(vec![audio("a.mp3")]).unwrap();
        ws.set_kind(MediaKind::Audio);
        assert_eq!(ws.files().len(), 1);
    }

    #[test]
    fn test_editing_inputs_releases_artifact() {
        let mut ws = MergeWorkspace::new(MediaKind::Audio);
        ws.select_files(vec![audio("a.mp3"), audio("b.mp3")]).unwrap();

        ws.set_output(artifact());
        assert!(ws.move_file(0, 1));
        assert!(ws.output().is_none());

        ws.set_output(artifact());
        assert!(ws.update_setting(0, ClipSettingPatch::default()));
        assert!(ws.output().is_none());

        ws.set_output(artifact());
        assert!(ws.remove_file(1));
        assert!(ws.output().is_none());
    }

    #[test]
    fn test_empty_selection_keeps_existing_files() {
        let mut ws = MergeWorkspace::new(MediaKind::Audio);
        ws.select_files(vec![audio("a.mp3"), audio("b.mp3")]).unwrap();
        assert_eq!(ws.select_files(vec![]).unwrap(), None);
        assert_eq!(ws.files().len(), 2);
    }

    #[test]
    fn test_rejected_selection_keeps_existing_files() {
        let mut ws = MergeWorkspace::new(MediaKind::Audio);
        ws.select_files(vec![audio("a.mp3")]).unwrap();
        let bad = SourceFile::new("x.txt", Some("text/plain".to_string()), vec![]);
        assert!(ws.select_files(vec![bad]).is_err());
        assert_eq!(ws.files().len(), 1);
    }

    #[test]
    fn test_clearing_cover_releases_artifact() {
        let mut ws = MergeWorkspace::new(MediaKind::Audio);
        ws.set_cover(CoverArt::new("image/jpeg", vec![1])).unwrap();
        ws.set_output(artifact());

        ws.clear_cover();
        assert!(ws.cover().is_none());
        assert!(ws.output().is_none());

        ws.set_output(artifact());
        ws.clear_cover();
        assert!(ws.output().is_some());
    }

    #[test]
    fn test_cover_is_audio_only() {
        let mut ws = MergeWorkspace::new(MediaKind::Video);
        assert!(ws.set_cover(CoverArt::new("image/png", vec![1])).is_err());
    }

    #[test]
    fn test_request_snapshot_and_file_name() {
        let mut ws = MergeWorkspace::new(MediaKind::Video);
        ws.set_mode(MergeMode::Reencode);
        ws.set_output_name("trip");
        let request = ws.request();
        assert_eq!(request.mode, MergeMode::Reencode);
        assert_eq!(ws.file_name(), "trip.mp4");
    }
}
