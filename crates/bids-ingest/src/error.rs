use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("study folder not found: {path}")]
    DirectoryNotFound { path: PathBuf },
    #[error("failed to read directory {path}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read csv file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("required file missing in study folder: {name}")]
    RequiredFileMissing { name: String },
    #[error("sheet {sheet} is missing required column {column:?}")]
    MissingColumn { sheet: String, column: String },
    #[error("invalid data type {value:?} for variable {variable:?} in sheet {sheet}")]
    InvalidDataType {
        sheet: String,
        variable: String,
        value: String,
    },
    #[error("task file name does not yield a usable task identifier: {name:?}")]
    InvalidTaskName { name: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
