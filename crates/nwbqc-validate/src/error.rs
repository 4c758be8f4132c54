//! Validation error types.

use std::fmt;
use std::path::PathBuf;

use nwbqc_core::{Category, CoreError};
use nwbqc_igor::IgorError;
use serde::Serialize;

/// Errors raised while validating one converted file.
///
/// Every variant is fatal for the file it occurs in and never for the batch.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("no original archive at {} (also tried .tar and .tgz)", base.display())]
    ArchiveNotFound { base: PathBuf },

    #[error("failed to extract {} into {}: {source}", archive.display(), dest.display())]
    ArchiveExtract {
        archive: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No mapping file entry and nothing to derive the archive name from.
    #[error("cannot derive an archive name from description {0:?}")]
    ArchiveName(String),

    #[error("no archive mapping for {stem}")]
    MissingMapping { stem: String },

    #[error("{}:{line}: {reason}", path.display())]
    MapParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("failed to open converted file {}: {reason}", path.display())]
    ContainerOpen { path: PathBuf, reason: String },

    #[error("failed to read {what} from converted file: {reason}")]
    ContainerRead { what: String, reason: String },

    #[error("converted file {} has no identifier", path.display())]
    MissingIdentifier { path: PathBuf },

    #[error("identifier {file_id:?} cannot name a scratch directory")]
    UnsafeIdentifier { file_id: String },

    #[error(
        "extraction directory {} is in use by another file with the same identifier",
        path.display()
    )]
    ScratchInUse { path: PathBuf },

    #[error("dataset {category}/{name} not found")]
    MissingDataset { category: Category, name: String },

    #[error("there are {category} datasets with the same name: {name}")]
    DuplicateDataset { category: Category, name: String },

    #[error("{category} dataset {name} has no row in the intracellular recordings table")]
    MissingAnnotationRow { category: Category, name: String },

    #[error("failed to read original file {}: {source}", path.display())]
    Original {
        path: PathBuf,
        #[source]
        source: IgorError,
    },

    #[error("cannot {operation}: {reason}")]
    InvalidState {
        operation: &'static str,
        reason: &'static str,
    },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ValidateError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Step of the per-file lifecycle an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Locating the original archive.
    Resolve,
    /// Opening the converted file and reading its identifier.
    Connect,
    /// Unpacking the archive into the scratch directory.
    Extract,
    /// File metadata and dataset checks.
    Validate,
    /// Closing the file and removing the scratch directory.
    Cleanup,
    /// Adding the file's results to the batch tree.
    Merge,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Connect => "connect",
            Self::Extract => "extract",
            Self::Validate => "validate",
            Self::Cleanup => "cleanup",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal error for one converted file, with enough context to report it.
#[derive(Debug, thiserror::Error)]
#[error(
    "{} ({}) failed during {stage}: {source}",
    path.display(),
    file_id.as_deref().unwrap_or("unknown id")
)]
pub struct FileError {
    pub path: PathBuf,
    pub file_id: Option<String>,
    pub stage: Stage,
    #[source]
    pub source: ValidateError,
}
