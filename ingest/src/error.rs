use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised by the ingestion pipeline. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input directory {path} is missing or unreadable: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed interaction file {path}: {reason}")]
    MalformedFile { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

impl IngestError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
