//! Study folder discovery.
//!
//! A study folder supplies:
//! - `demographics.csv` — subject id column plus arbitrary columns
//! - `participants_variables.csv` — variable definitions
//! - `participants_dataset.csv` — dataset-level key/value metadata
//! - any other `*.csv` — per-session response tables
//! - `resources/<task>_items.csv`, `<task>_meta.csv`, `<task>_nonlikert.csv`
//!   — the three sheets of one task definition source, grouped by stem.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use bids_model::Sheet;

use crate::csv_sheet::read_csv_sheet;
use crate::error::{IngestError, Result};

pub const DEMOGRAPHICS_FILE: &str = "demographics";
pub const VARIABLES_FILE: &str = "participants_variables";
pub const DATASET_FILE: &str = "participants_dataset";
pub const RESOURCES_DIR: &str = "resources";

const ITEMS_SUFFIX: &str = "_items";
const META_SUFFIX: &str = "_meta";
const NONLIKERT_SUFFIX: &str = "_nonlikert";

/// The sheets found for one task definition source.
///
/// Any sheet may be absent; the cross-reference validator enforces the
/// minimum sheet count so a short source is reported, not guessed at.
#[derive(Debug, Clone)]
pub struct TaskSource {
    /// Raw task stem as spelled in the file names.
    pub name: String,
    pub items: Option<Sheet>,
    pub meta: Option<Sheet>,
    pub non_likert: Option<Sheet>,
}

impl TaskSource {
    pub fn sheet_count(&self) -> usize {
        [
            self.items.is_some(),
            self.meta.is_some(),
            self.non_likert.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Everything read from a study folder, as already-parsed sheets.
#[derive(Debug)]
pub struct StudyFolder {
    pub demographics: Sheet,
    pub variables: Sheet,
    pub dataset_metadata: Option<Sheet>,
    pub sessions: Vec<Sheet>,
    pub tasks: Vec<TaskSource>,
}

/// Lists all CSV files in a directory, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("")
}

/// Read a study folder into sheets.
pub fn load_study(study_folder: &Path) -> Result<StudyFolder> {
    let csv_files = list_csv_files(study_folder)?;

    let mut demographics = None;
    let mut variables = None;
    let mut dataset_metadata = None;
    let mut sessions = Vec::new();

    for path in &csv_files {
        let stem = file_stem(path);
        if stem.starts_with("~$") {
            // Editor lock files.
            continue;
        }
        let sheet = read_csv_sheet(path)?;
        if stem.eq_ignore_ascii_case(DEMOGRAPHICS_FILE) {
            demographics = Some(sheet);
        } else if stem.eq_ignore_ascii_case(VARIABLES_FILE) {
            variables = Some(sheet);
        } else if stem.eq_ignore_ascii_case(DATASET_FILE) {
            dataset_metadata = Some(sheet);
        } else {
            sessions.push(sheet);
        }
    }

    let demographics = demographics.ok_or_else(|| IngestError::RequiredFileMissing {
        name: format!("{DEMOGRAPHICS_FILE}.csv"),
    })?;
    let variables = variables.ok_or_else(|| IngestError::RequiredFileMissing {
        name: format!("{VARIABLES_FILE}.csv"),
    })?;

    let tasks = load_task_sources(&study_folder.join(RESOURCES_DIR))?;
    info!(
        session_count = sessions.len(),
        task_count = tasks.len(),
        "study folder loaded"
    );

    Ok(StudyFolder {
        demographics,
        variables,
        dataset_metadata,
        sessions,
        tasks,
    })
}

/// Group the CSV files of a resources directory into task sources by stem.
pub fn load_task_sources(resources_dir: &Path) -> Result<Vec<TaskSource>> {
    if !resources_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut grouped: BTreeMap<String, TaskSource> = BTreeMap::new();
    for path in list_csv_files(resources_dir)? {
        let stem = file_stem(&path).to_string();
        let Some((task_stem, role_suffix)) = split_task_stem(&stem) else {
            debug!(file = %path.display(), "resources file ignored (no task sheet suffix)");
            continue;
        };
        let sheet = read_csv_sheet(&path)?;
        let source = grouped
            .entry(task_stem.to_lowercase())
            .or_insert_with(|| TaskSource {
                name: task_stem.to_string(),
                items: None,
                meta: None,
                non_likert: None,
            });
        match role_suffix {
            ITEMS_SUFFIX => source.items = Some(sheet),
            META_SUFFIX => source.meta = Some(sheet),
            NONLIKERT_SUFFIX => source.non_likert = Some(sheet),
            _ => unreachable!("split_task_stem only yields known suffixes"),
        }
    }
    Ok(grouped.into_values().collect())
}

/// Split `<task><suffix>` into the task stem and the sheet role suffix.
fn split_task_stem(stem: &str) -> Option<(&str, &'static str)> {
    let lowered = stem.to_ascii_lowercase();
    for suffix in [ITEMS_SUFFIX, META_SUFFIX, NONLIKERT_SUFFIX] {
        if let Some(prefix_len) = lowered.strip_suffix(suffix).map(str::len)
            && prefix_len > 0
        {
            return Some((&stem[..prefix_len], suffix));
        }
    }
    None
}
