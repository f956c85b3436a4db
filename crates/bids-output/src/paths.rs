//! BIDS file and directory naming.
//!
//! All paths are relative to the dataset root (`rawdata/`); the writing
//! collaborator anchors them.

use std::path::PathBuf;

use bids_model::{SessionId, SubjectId, TaskName};

pub const PARTICIPANTS_TSV: &str = "participants.tsv";
pub const PARTICIPANTS_JSON: &str = "participants.json";
pub const DATASET_DESCRIPTION_JSON: &str = "dataset_description.json";

/// `task-<name>_beh.json`
pub fn task_sidecar_path(task: &TaskName) -> PathBuf {
    PathBuf::from(format!("task-{task}_beh.json"))
}

/// `sub-<id>/ses-<s>/beh/`
pub fn session_dir(subject: &SubjectId, session: &SessionId) -> PathBuf {
    PathBuf::from(subject.as_str())
        .join(format!("ses-{session}"))
        .join("beh")
}

/// `sub-<id>/ses-<s>/beh/sub-<id>_ses-<s>_task-<name>_beh.tsv`
pub fn task_table_path(subject: &SubjectId, session: &SessionId, task: &TaskName) -> PathBuf {
    session_dir(subject, session).join(format!("{subject}_ses-{session}_task-{task}_beh.tsv"))
}
