use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Table(TableError),
    #[error("{0}")]
    Config(ConfigError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
}

/// Failure to read one of the mount tables. Scoped to a single collection cycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("{} unavailable: {reason}", path.display())]
    Unavailable { path: PathBuf, reason: String },
    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ExporterError>;

impl ExporterError {
    pub fn message(msg: impl Into<String>) -> Self {
        ExporterError::Message(msg.into())
    }
}

impl TableError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TableError::Unavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        TableError::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

impl From<TableError> for ExporterError {
    fn from(err: TableError) -> Self {
        ExporterError::Table(err)
    }
}

impl From<ConfigError> for ExporterError {
    fn from(err: ConfigError) -> Self {
        ExporterError::Config(err)
    }
}
