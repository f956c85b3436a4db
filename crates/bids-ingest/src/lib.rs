//! Study ingestion: CSV sheet reading, study-folder discovery, and the
//! definition parsers that turn raw sheets into the typed model.

mod csv_sheet;
mod discovery;
mod error;
mod levels;
mod sessions;
mod tasks;
mod variables;

pub use csv_sheet::read_csv_sheet;
pub use discovery::{
    DATASET_FILE, DEMOGRAPHICS_FILE, RESOURCES_DIR, StudyFolder, TaskSource, VARIABLES_FILE,
    list_csv_files, load_study, load_task_sources,
};
pub use error::{IngestError, Result};
pub use levels::{LevelPairColumns, ResolvedLevels, level_columns, resolve_item_levels};
pub use sessions::{ParsedSessions, SESSION_COLUMN, SUBJECT_COLUMN, parse_session_sheet};
pub use tasks::{ParsedTask, normalize_item_name, parse_task_source};
pub use variables::{
    LevelsStringError, ParsedVariables, parse_dataset_metadata_sheet, parse_levels_string,
    parse_variable_sheet,
};
