//! Output generation: BIDS sidecar documents, participants files, and
//! per-subject/session/task tables.

mod documents;
mod emit;
mod paths;
mod tables;

pub use documents::{
    DEFAULT_BIDS_VERSION, dataset_description, participants_sidecar, render_json, task_sidecar,
};
pub use emit::{Artifact, ArtifactContent, EmitResult, NormalizedTask, emit_dataset};
pub use paths::{
    DATASET_DESCRIPTION_JSON, PARTICIPANTS_JSON, PARTICIPANTS_TSV, session_dir, task_sidecar_path,
    task_table_path,
};
pub use tables::{participants_table, task_table};
