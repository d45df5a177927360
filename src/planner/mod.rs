//! Merge job planning: per-clip passes, concat manifest and final operations

use serde::Serialize;
use tracing::debug;

use crate::domain::model::*;

pub mod codec;
pub mod strategy;

pub use codec::{format_seconds, renders_nonzero, CodecProfile};
pub use strategy::{ConcatAttempt, ConcatPolicy};

/// Name of the concat demuxer manifest in the engine filesystem
pub const MANIFEST_NAME: &str = "list.txt";

/// One engine invocation and the file it produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOp {
    pub args: Vec<String>,
    pub output: String,
}

/// A source file staged under a deterministic engine name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedInput {
    pub source_index: usize,
    pub name: String,
}

/// Everything needed to run one merge job, derived fresh per invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPlan {
    pub kind: MediaKind,
    pub mode: MergeMode,
    pub inputs: Vec<StagedInput>,
    pub needs_per_clip_processing: bool,
    pub clip_ops: Vec<EngineOp>,
    pub manifest_name: String,
    pub manifest: String,
    pub concat: ConcatPolicy,
    pub copy_concat_op: EngineOp,
    pub reencode_concat_op: EngineOp,
    pub cover_input: Option<String>,
    pub cover_op: Option<EngineOp>,
}

impl JobPlan {
    pub fn concat_op(&self, attempt: ConcatAttempt) -> &EngineOp {
        match attempt {
            ConcatAttempt::Copy => &self.copy_concat_op,
            ConcatAttempt::Reencode => &self.reencode_concat_op,
        }
    }

    /// File holding the finished artifact
    pub fn final_output(&self) -> &str {
        match &self.cover_op {
            Some(op) => &op.output,
            None => &self.copy_concat_op.output,
        }
    }

    /// Every engine file the job writes, for cleanup
    pub fn scratch_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inputs.iter().map(|i| i.name.clone()).collect();
        names.extend(self.clip_ops.iter().map(|op| op.output.clone()));
        names.push(self.manifest_name.clone());
        names.push(self.copy_concat_op.output.clone());
        if let Some(cover) = &self.cover_input {
            names.push(cover.clone());
        }
        if let Some(op) = &self.cover_op {
            names.push(op.output.clone());
        }
        names
    }
}

/// Builds [`JobPlan`]s from validated inputs
#[derive(Debug, Clone, Default)]
pub struct ClipPlanBuilder {
    profile: CodecProfile,
}

impl ClipPlanBuilder {
    pub fn new(profile: CodecProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &CodecProfile {
        &self.profile
    }

    /// Per-clip passes run when re-encoding is requested or any clip is edited
    pub fn needs_per_clip_processing(files: &OrderedFileSet, mode: MergeMode) -> bool {
        mode == MergeMode::Reencode || files.settings().any(ClipSetting::has_edits)
    }

    pub fn build(
        &self,
        files: &OrderedFileSet,
        kind: MediaKind,
        mode: MergeMode,
        cover: Option<&CoverArt>,
    ) -> JobPlan {
        let inputs: Vec<StagedInput> = files
            .files()
            .enumerate()
            .map(|(i, file)| StagedInput {
                source_index: i,
                name: staged_input_name(i, file, kind),
            })
            .collect();

        let needs_per_clip_processing = Self::needs_per_clip_processing(files, mode);
        let clip_ops: Vec<EngineOp> = if needs_per_clip_processing {
            files
                .settings()
                .zip(&inputs)
                .enumerate()
                .map(|(i, (setting, input))| self.clip_op(i, &input.name, setting, kind))
                .collect()
        } else {
            Vec::new()
        };

        let concat_names: Vec<&str> = if needs_per_clip_processing {
            clip_ops.iter().map(|op| op.output.as_str()).collect()
        } else {
            inputs.iter().map(|i| i.name.as_str()).collect()
        };
        let manifest = build_manifest(&concat_names);

        let concat_output = format!("output.{}", kind.output_extension());
        let copy_concat_op = EngineOp {
            args: concat_args(&["-c".to_string(), "copy".to_string()], &concat_output),
            output: concat_output.clone(),
        };
        let reencode_concat_op = EngineOp {
            args: concat_args(&self.profile.encode_args(kind), &concat_output),
            output: concat_output.clone(),
        };

        let (cover_input, cover_op) = match (kind, cover) {
            (MediaKind::Audio, Some(cover)) => {
                let cover_name = format!("cover.{}", cover.extension());
                let op = cover_op(&concat_output, &cover_name);
                (Some(cover_name), Some(op))
            }
            _ => (None, None),
        };

        let plan = JobPlan {
            kind,
            mode,
            inputs,
            needs_per_clip_processing,
            clip_ops,
            manifest_name: MANIFEST_NAME.to_string(),
            manifest,
            concat: ConcatPolicy::select(needs_per_clip_processing, mode),
            copy_concat_op,
            reencode_concat_op,
            cover_input,
            cover_op,
        };
        debug!(
            files = plan.inputs.len(),
            per_clip = plan.needs_per_clip_processing,
            cover = plan.cover_op.is_some(),
            "built merge plan"
        );
        plan
    }

    fn clip_op(&self, index: usize, input: &str, setting: &ClipSetting, kind: MediaKind) -> EngineOp {
        let output = intermediate_name(index, kind);
        let mut args = Vec::new();

        if renders_nonzero(setting.start) {
            args.push("-ss".to_string());
            args.push(format_seconds(setting.start));
        }
        if renders_nonzero(setting.end) {
            args.push("-to".to_string());
            args.push(format_seconds(setting.end));
        }
        args.push("-i".to_string());
        args.push(input.to_string());

        let audio_fades = fade_chain("afade", setting);
        if !audio_fades.is_empty() {
            args.push("-af".to_string());
            args.push(audio_fades);
        }
        if kind == MediaKind::Video {
            let video_fades = fade_chain("fade", setting);
            if !video_fades.is_empty() {
                args.push("-vf".to_string());
                args.push(video_fades);
            }
        }

        args.extend(self.profile.encode_args(kind));
        args.push(output.clone());
        EngineOp { args, output }
    }
}

/// `input_00.mp3`; keeps a sane source extension, else the kind default
pub fn staged_input_name(index: usize, file: &SourceFile, kind: MediaKind) -> String {
    let ext = file
        .extension()
        .filter(|ext| ext.len() <= 5)
        .map(|ext| ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| kind.output_extension().to_string());
    format!("input_{:02}.{}", index, ext)
}

/// `clip_00.mp3`; never collides with staged input names
pub fn intermediate_name(index: usize, kind: MediaKind) -> String {
    format!("clip_{:02}.{}", index, kind.output_extension())
}

/// Concat demuxer manifest, one quoted name per line
pub fn build_manifest(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("file '{}'", name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-joined fade filters anchored on the trimmed clip timeline
fn fade_chain(filter: &str, setting: &ClipSetting) -> String {
    let mut filters = Vec::new();
    if renders_nonzero(setting.fade_in) {
        filters.push(format!(
            "{}=t=in:st=0:d={}",
            filter,
            format_seconds(setting.fade_in)
        ));
    }
    if renders_nonzero(setting.fade_out) {
        if let Some(duration) = setting.duration() {
            let anchor = (duration - setting.fade_out).max(0.0);
            filters.push(format!(
                "{}=t=out:st={}:d={}",
                filter,
                format_seconds(anchor),
                format_seconds(setting.fade_out)
            ));
        }
    }
    filters.join(",")
}

fn concat_args(codec_args: &[String], output: &str) -> Vec<String> {
    let mut args: Vec<String> = ["-f", "concat", "-safe", "0", "-i", MANIFEST_NAME]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend_from_slice(codec_args);
    args.push(output.to_string());
    args
}

fn cover_op(audio: &str, cover: &str) -> EngineOp {
    let output = "output_cover.mp3".to_string();
    let args = [
        "-i",
        audio,
        "-i",
        cover,
        "-map",
        "0:a",
        "-map",
        "1:v",
        "-c",
        "copy",
        "-id3v2_version",
        "3",
        "-metadata:s:v",
        "title=Album cover",
        "-metadata:s:v",
        "comment=Cover (front)",
        "-disposition:v",
        "attached_pic",
        output.as_str(),
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    EngineOp { args, output }
}
