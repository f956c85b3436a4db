//! Artifact materialization.
//!
//! Emission is pure; this is the file-writing collaborator that anchors
//! relative artifact paths under the dataset root and writes the rendered
//! bytes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use bids_output::Artifact;

pub fn write_artifacts(dataset_root: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dataset_root.join(&artifact.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        std::fs::write(&path, artifact.render())
            .with_context(|| format!("write {}", path.display()))?;
        debug!(path = %path.display(), "artifact written");
        written.push(path);
    }
    Ok(written)
}
