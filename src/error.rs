use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsingError {
    /// Rejected before any simulation work begins.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Output file or directory could not be written.
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<validator::ValidationErrors> for IsingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Config(errors.to_string())
    }
}

impl IsingError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
