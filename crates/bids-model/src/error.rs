use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid subject id: {0:?}")]
    InvalidSubjectId(String),
    #[error("invalid session id: {0:?}")]
    InvalidSessionId(String),
    #[error("invalid task name: {0:?}")]
    InvalidTaskName(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
