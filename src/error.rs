use std::path::PathBuf;

use thiserror::Error;

/// Why a table could not be read.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("no data rows in {}", path.display())]
    Empty { path: PathBuf },

    #[error("malformed data in {} at line {line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything that can stop a single chart from being produced.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("column '{column}' not present in the combined table")]
    UnknownColumn { column: String },

    #[error("unknown colour '{name}'")]
    UnknownColor { name: String },

    #[error("template '{template}': {reason}")]
    Template { template: String, reason: String },

    #[error("rendering {}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Coarse classification used for log levels and the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    Malformed,
    Empty,
    Other,
}

impl ChartError {
    pub fn reason(&self) -> SkipReason {
        match self {
            ChartError::Load(LoadError::NotFound { .. }) => SkipReason::Missing,
            ChartError::Load(LoadError::Malformed { .. }) => SkipReason::Malformed,
            ChartError::Load(LoadError::Empty { .. }) => SkipReason::Empty,
            _ => SkipReason::Other,
        }
    }
}
