//! # nwbqc-validate
//!
//! Cross-validation of converted NWB files against the original Igor
//! archives they were produced from.
//!
//! - [`archive`]: locating, naming and unpacking original archives
//! - [`container`]: the read interface of converted files
//! - [`original`]: locating and parsing a dataset's original file
//! - [`dataset`]: the per-dataset checks
//! - [`file`]: the per-file lifecycle with guaranteed scratch cleanup
//! - [`batch`]: parallel validation of many files
//!
//! Converted files are read through [`RecordingContainer`]; [`MemoryContainer`]
//! serves tests and embedders, [`nwb::NwbOpener`] real NWB files.

pub mod archive;
pub mod batch;
pub mod container;
pub mod dataset;
pub mod error;
pub mod file;
pub mod memory;
pub mod nwb;
pub mod original;

pub use archive::{
    ArchiveLocator, ArchiveMap, derive_archive_name, extract_archive, resolve_archive,
};
pub use batch::{BatchOutcome, QcSession, discover_nwb_files};
pub use container::{AnnotationIndex, ContainerOpener, DatasetRecord, RecordingContainer};
pub use dataset::{DatasetValidator, data_equal, is_close};
pub use error::{FileError, Stage, ValidateError};
pub use file::{ExtractionDir, FileValidator};
pub use memory::{MemoryContainer, MemoryOpener};
pub use original::{IgorReader, OriginalLocation, OriginalReader, OriginalRecord, locate_original};
