//! Command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::app::{AppContainer, DefaultAppContainer, MergeWorkspace};
use crate::cli::args::MergeArgs;
use crate::config_initialization::MergeConfig;
use crate::domain::model::{CoverArt, MediaKind, MergeMode, SourceFile};
use crate::domain::rules::InputValidator;

/// Execute the merge command
pub async fn merge(args: MergeArgs, config: &MergeConfig) -> Result<()> {
    info!("Starting merge operation");
    let workspace = load_workspace(&args).await?;
    let request = workspace.request();

    let container = DefaultAppContainer::new(config);
    let interactor = container.merge_interactor();
    let output = interactor.merge(&request).await?;

    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    let path = args.out_dir.join(&output.file_name);
    tokio::fs::write(&path, &output.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Merge operation completed successfully");
    println!("{}", path.display());
    Ok(())
}

/// Execute the plan command
pub async fn plan(args: MergeArgs, config: &MergeConfig) -> Result<()> {
    let workspace = load_workspace(&args).await?;
    let request = workspace.request();

    let container = DefaultAppContainer::new(config);
    let plan = container.merge_interactor().plan(&request)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Read inputs, edits and cover into a workspace
async fn load_workspace(args: &MergeArgs) -> Result<MergeWorkspace> {
    let kind = MediaKind::parse(&args.kind)?;
    let mode = MergeMode::parse(&args.mode)?;

    let mut workspace = MergeWorkspace::new(kind);
    workspace.set_mode(mode);
    if let Some(name) = &args.output {
        workspace.set_output_name(name);
    }

    let mut files = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        files.push(read_source(path).await?);
    }

    // Edits count inputs in command-line order; resolve them before
    // wrong-kind files are dropped from the selection
    let positions = kept_positions(&files, kind);
    let mut resolved = Vec::with_capacity(args.edits.len());
    for edit in &args.edits {
        let Some(position) = positions.get(edit.clip - 1) else {
            bail!(
                "Edit refers to clip {} but only {} files were given",
                edit.clip,
                files.len()
            );
        };
        let Some(index) = *position else {
            bail!(
                "Edit refers to clip {} ({}), which is not an accepted {} file",
                edit.clip,
                files[edit.clip - 1].name,
                kind
            );
        };
        resolved.push((index, edit.patch));
    }

    if let Some(warning) = workspace.select_files(files)? {
        warn!("{}", warning);
    }
    for (index, patch) in resolved {
        workspace.update_setting(index, patch);
    }

    if let Some(path) = &args.cover {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read cover {}", path.display()))?;
        workspace.set_cover(CoverArt::new(image_mime(path), data))?;
    }

    Ok(workspace)
}

/// Position each input will take in the filtered selection, `None` if dropped
fn kept_positions(files: &[SourceFile], kind: MediaKind) -> Vec<Option<usize>> {
    let mut kept = 0;
    files
        .iter()
        .map(|file| {
            InputValidator::matches_kind(file, kind).then(|| {
                kept += 1;
                kept - 1
            })
        })
        .collect()
}

async fn read_source(path: &Path) -> Result<SourceFile> {
    if !path.exists() {
        bail!("Input file does not exist: {}", path.display());
    }
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(SourceFile::new(name, None, data))
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
