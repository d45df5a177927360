//! Fixed output codec settings for intermediates and re-encode merges

use serde::{Deserialize, Serialize};

use crate::domain::model::MediaKind;

/// Encoder arguments shared by per-clip passes and re-encode concatenation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecProfile {
    /// Constant-bitrate lossy codec for audio jobs
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Video jobs
    pub video_codec: String,
    pub video_audio_codec: String,
    pub movflags: String,
}

impl Default for CodecProfile {
    fn default() -> Self {
        Self {
            audio_codec: "libmp3lame".to_string(),
            audio_bitrate: "192k".to_string(),
            video_codec: "libx264".to_string(),
            video_audio_codec: "aac".to_string(),
            movflags: "+faststart".to_string(),
        }
    }
}

impl CodecProfile {
    pub fn with_audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.audio_bitrate = bitrate.into();
        self
    }

    /// Encoder selection for the given media kind
    pub fn encode_args(&self, kind: MediaKind) -> Vec<String> {
        match kind {
            MediaKind::Audio => vec![
                "-vn".to_string(),
                "-c:a".to_string(),
                self.audio_codec.clone(),
                "-b:a".to_string(),
                self.audio_bitrate.clone(),
            ],
            MediaKind::Video => vec![
                "-c:v".to_string(),
                self.video_codec.clone(),
                "-c:a".to_string(),
                self.video_audio_codec.clone(),
                "-movflags".to_string(),
                self.movflags.clone(),
            ],
        }
    }
}

/// Render seconds for engine arguments, rounded to milliseconds
pub fn format_seconds(seconds: f64) -> String {
    let rounded = (seconds * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

/// False for values that render as `0` at millisecond precision
pub fn renders_nonzero(seconds: f64) -> bool {
    (seconds * 1000.0).round() > 0.0
}
