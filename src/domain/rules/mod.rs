// Domain rules - Input filtering and clip setting validation

use std::fmt;

use tracing::debug;

use crate::domain::model::*;
use crate::error::MergeError;

/// Outcome of offering a new file selection
#[derive(Debug, Clone)]
pub enum Selection {
    /// Nothing was offered
    Ignored,
    /// Files of the expected kind, plus a warning when some were dropped
    Accepted {
        files: OrderedFileSet,
        warning: Option<String>,
    },
}

/// Clip setting rule that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingViolation {
    NegativeValue,
    EndNotAfterStart,
    FadeOutWithoutEnd,
    FadesExceedDuration,
}

impl fmt::Display for SettingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SettingViolation::NegativeValue => {
                "Start, end and fade values must be zero or greater."
            }
            SettingViolation::EndNotAfterStart => "End time must be greater than start time.",
            SettingViolation::FadeOutWithoutEnd => "Fade-out requires an end time.",
            SettingViolation::FadesExceedDuration => {
                "Fade-in plus fade-out cannot exceed the clip duration."
            }
        };
        f.write_str(text)
    }
}

/// Minimum number of files for a merge
pub const MIN_MERGE_FILES: usize = 2;

/// Business rules for accepting and validating inputs
pub struct InputValidator;

impl InputValidator {
    /// Permissive classifier: MIME prefix or known extension
    pub fn matches_kind(file: &SourceFile, kind: MediaKind) -> bool {
        let mime_match = file
            .mime
            .as_deref()
            .map(|m| m.to_lowercase().starts_with(kind.mime_prefix()))
            .unwrap_or(false);
        mime_match
            || file
                .extension()
                .map(|ext| kind.accepted_extensions().contains(&ext.as_str()))
                .unwrap_or(false)
    }

    /// Filter an incoming selection down to the given media kind
    pub fn accept_selection(
        incoming: Vec<SourceFile>,
        kind: MediaKind,
    ) -> Result<Selection, MergeError> {
        if incoming.is_empty() {
            return Ok(Selection::Ignored);
        }

        let offered = incoming.len();
        let kept: Vec<SourceFile> = incoming
            .into_iter()
            .filter(|f| Self::matches_kind(f, kind))
            .collect();

        if kept.is_empty() {
            return Err(MergeError::validation(format!(
                "Please select {} files only. ({})",
                kind,
                kind.accepted_extensions().join(", ")
            )));
        }

        let warning = (kept.len() != offered).then(|| {
            format!(
                "Kept {} of {} files ({} only: {})",
                kept.len(),
                offered,
                kind,
                kind.accepted_extensions().join(", ")
            )
        });
        debug!(kept = kept.len(), offered, "accepted file selection");

        Ok(Selection::Accepted {
            files: OrderedFileSet::from_files(kept),
            warning,
        })
    }

    /// Check one setting against the clip invariants
    pub fn check_setting(setting: &ClipSetting) -> Result<(), SettingViolation> {
        let fields = [setting.start, setting.end, setting.fade_in, setting.fade_out];
        if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SettingViolation::NegativeValue);
        }
        if setting.end > 0.0 && setting.end <= setting.start {
            return Err(SettingViolation::EndNotAfterStart);
        }
        if setting.fade_out > 0.0 && setting.end <= 0.0 {
            return Err(SettingViolation::FadeOutWithoutEnd);
        }
        if let Some(duration) = setting.duration() {
            if setting.fade_in + setting.fade_out > duration {
                return Err(SettingViolation::FadesExceedDuration);
            }
        }
        Ok(())
    }

    /// Validate every setting; the first violation names its 1-based clip
    pub fn validate_settings<'a>(
        settings: impl IntoIterator<Item = &'a ClipSetting>,
    ) -> Result<(), MergeError> {
        for (i, setting) in settings.into_iter().enumerate() {
            if let Err(violation) = Self::check_setting(setting) {
                return Err(MergeError::validation(format!("Clip {}: {}", i + 1, violation)));
            }
        }
        Ok(())
    }

    /// Full pre-merge validation of a request
    pub fn validate_request(files: &OrderedFileSet, kind: MediaKind) -> Result<(), MergeError> {
        if files.len() < MIN_MERGE_FILES {
            return Err(MergeError::validation("Please select at least two files."));
        }
        if let Some((i, entry)) = files
            .entries()
            .iter()
            .enumerate()
            .find(|(_, e)| !Self::matches_kind(&e.file, kind))
        {
            return Err(MergeError::validation(format!(
                "File {} ({}) is not a {} file.",
                i + 1,
                entry.file.name,
                kind
            )));
        }
        Self::validate_settings(files.settings())
    }
}
