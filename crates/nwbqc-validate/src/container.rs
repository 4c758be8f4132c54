//! Read access to a converted recording file.
//!
//! The validators only see converted files through [`RecordingContainer`], so
//! the HDF5 reader and the in-memory container are interchangeable.

use std::collections::BTreeMap;
use std::path::Path;

use nwbqc_core::{Category, RawString, RequiredField};

use crate::error::ValidateError;

/// Per-category annotation index: dataset name to its row's annotation.
///
/// A row without an annotation value maps to `None`; a dataset with no row
/// at all is absent from the map.
pub type AnnotationIndex = BTreeMap<String, Option<RawString>>;

/// One channel or sweep of a converted file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRecord {
    pub name: String,
    pub data: Vec<f64>,
    /// Sampling rate in Hz.
    pub rate: f64,
    pub gain: Option<f64>,
    /// Path of the original file inside its archive, possibly prefixed with
    /// the acquisition machine's directory layout.
    pub description: String,
}

impl DatasetRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Vec::new(),
            rate: 0.0,
            gain: None,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<f64>) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub const fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    #[must_use]
    pub const fn with_gain(mut self, gain: f64) -> Self {
        self.gain = Some(gain);
        self
    }
}

/// An opened converted file.
pub trait RecordingContainer {
    /// The file's stable identifier; `None` when absent or empty.
    fn identifier(&self) -> Option<String>;

    /// Whether a required file-level field exists and is non-empty.
    fn field_present(&self, field: RequiredField) -> bool;

    /// Dataset names of one category, duplicates included, in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::ContainerRead`] if the category cannot be listed.
    fn dataset_names(&self, category: Category) -> Result<Vec<String>, ValidateError>;

    /// Read one dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::MissingDataset`] or
    /// [`ValidateError::ContainerRead`].
    fn dataset(&self, category: Category, name: &str) -> Result<DatasetRecord, ValidateError>;

    /// The per-category annotation index.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::ContainerRead`] if the index cannot be read.
    fn annotation_index(&self, category: Category) -> Result<AnnotationIndex, ValidateError>;
}

/// Opens converted files for reading.
pub trait ContainerOpener: Sync {
    type Container: RecordingContainer;

    /// Open the file at `path`. The container is closed when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::ContainerOpen`] if the file cannot be opened.
    fn open(&self, path: &Path) -> Result<Self::Container, ValidateError>;
}
