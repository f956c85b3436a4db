//! Assembly of the full artifact set from a validated dataset.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use bids_model::{ConvertOptions, Dataset, Issue, TaskDefinition};
use bids_transform::{DemographicsRow, TaskRow};

use crate::documents::{dataset_description, participants_sidecar, render_json, task_sidecar};
use crate::paths::{
    DATASET_DESCRIPTION_JSON, PARTICIPANTS_JSON, PARTICIPANTS_TSV, task_sidecar_path,
    task_table_path,
};
use crate::tables::{participants_table, task_table};

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactContent {
    Json(Value),
    Tsv(String),
}

/// One output file, path relative to the dataset root.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: ArtifactContent,
}

impl Artifact {
    fn json(path: impl Into<PathBuf>, value: Value) -> Self {
        Self {
            path: path.into(),
            content: ArtifactContent::Json(value),
        }
    }

    fn tsv(path: impl Into<PathBuf>, table: String) -> Self {
        Self {
            path: path.into(),
            content: ArtifactContent::Tsv(table),
        }
    }

    /// Final bytes for the writing collaborator.
    pub fn render(&self) -> String {
        match &self.content {
            ArtifactContent::Json(value) => render_json(value),
            ArtifactContent::Tsv(table) => table.clone(),
        }
    }
}

/// Normalized rows for one task, borrowed from the normalization stage.
#[derive(Debug)]
pub struct NormalizedTask<'a> {
    pub task: &'a TaskDefinition,
    pub rows: &'a [TaskRow],
}

#[derive(Debug, Default)]
pub struct EmitResult {
    pub artifacts: Vec<Artifact>,
    /// Non-fatal warnings raised while assembling documents.
    pub issues: Vec<Issue>,
}

/// Emit the full artifact set for a validated dataset.
///
/// Pure over its inputs: identical validated input produces byte-identical
/// artifacts, with ordering fixed by definition order throughout. Tasks
/// with no normalized rows emit neither tables nor a sidecar.
pub fn emit_dataset(
    dataset: &Dataset,
    demographics: &[DemographicsRow],
    tasks: &[NormalizedTask<'_>],
    options: &ConvertOptions,
) -> EmitResult {
    let mut result = EmitResult::default();

    let (description, issues) = dataset_description(&dataset.metadata, &dataset.study_name);
    result.issues.extend(issues);
    result
        .artifacts
        .push(Artifact::json(DATASET_DESCRIPTION_JSON, description));

    result.artifacts.push(Artifact::json(
        PARTICIPANTS_JSON,
        participants_sidecar(&dataset.variables),
    ));
    result.artifacts.push(Artifact::tsv(
        PARTICIPANTS_TSV,
        participants_table(&dataset.variables, demographics, options),
    ));

    for normalized in tasks {
        if normalized.rows.is_empty() {
            // No collected data: drop the sidecar rather than emit an
            // orphan document.
            debug!(task = %normalized.task.name, "task has no rows; sidecar skipped");
            continue;
        }
        result.artifacts.push(Artifact::json(
            task_sidecar_path(&normalized.task.name),
            task_sidecar(normalized.task, options.anonymize),
        ));
        for row in normalized.rows {
            result.artifacts.push(Artifact::tsv(
                task_table_path(&row.subject, &row.session, &normalized.task.name),
                task_table(normalized.task, row, options),
            ));
        }
    }

    info!(
        artifact_count = result.artifacts.len(),
        warning_count = result.issues.len(),
        "dataset emitted"
    );
    result
}
