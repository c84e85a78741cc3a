use thiserror::Error;

/// Errors surfaced by the environment and its collaborators.
///
/// Contract violations (`InvalidAction`, `NotReset`, `InvalidConfig`) are
/// reported before any state is touched and are not worth retrying.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid action {index}: expected an index below {size}")]
    InvalidAction { index: usize, size: usize },

    #[error("environment must be reset before stepping")]
    NotReset,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}
