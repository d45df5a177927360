//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::ClipSettingPatch;
use crate::utils::parse_time;

/// Arguments shared by `merge` and `plan`
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Media kind: audio or video
    #[arg(short, long, default_value = "audio")]
    pub kind: String,

    /// Merge mode: copy or reencode
    #[arg(short, long, default_value = "copy")]
    pub mode: String,

    /// Input files, in merge order
    #[arg(short, long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Per-clip edit: N=START,END,FADE_IN,FADE_OUT (N is 1-based)
    #[arg(short, long = "edit", value_parser = parse_edit)]
    pub edits: Vec<EditArg>,

    /// Cover image embedded into audio output
    #[arg(long)]
    pub cover: Option<PathBuf>,

    /// Output base name without extension
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory for the merged file
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// Parsed `--edit` value
#[derive(Debug, Clone, Copy)]
pub struct EditArg {
    /// 1-based clip number
    pub clip: usize,
    pub patch: ClipSettingPatch,
}

/// Parse `N=START,END,FADE_IN,FADE_OUT`; empty or missing fields stay unchanged
pub fn parse_edit(value: &str) -> Result<EditArg, String> {
    let (clip, fields) = value
        .split_once('=')
        .ok_or_else(|| format!("Invalid edit '{}': expected N=START,END,FADE_IN,FADE_OUT", value))?;
    let clip: usize = clip
        .trim()
        .parse()
        .map_err(|_| format!("Invalid clip number '{}'", clip.trim()))?;
    if clip == 0 {
        return Err("Clip numbers start at 1".to_string());
    }

    let parts: Vec<&str> = fields.split(',').collect();
    if parts.len() > 4 {
        return Err(format!("Too many fields in edit '{}'", value));
    }
    let mut values = [None; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        if !part.trim().is_empty() {
            *slot = Some(parse_time(part).map_err(|e| e.to_string())?);
        }
    }

    Ok(EditArg {
        clip,
        patch: ClipSettingPatch {
            start: values[0],
            end: values[1],
            fade_in: values[2],
            fade_out: values[3],
        },
    })
}
