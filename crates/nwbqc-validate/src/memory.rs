//! In-memory converted files.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use nwbqc_core::{Category, CheckName, RawString, RequiredField};

use crate::container::{
    AnnotationIndex, ContainerOpener, DatasetRecord, RecordingContainer,
};
use crate::error::ValidateError;

/// A converted file held in memory, built up field by field.
///
/// New containers have every required field present.
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    identifier: Option<String>,
    fields: BTreeSet<RequiredField>,
    datasets: BTreeMap<Category, Vec<DatasetRecord>>,
    annotations: BTreeMap<Category, AnnotationIndex>,
}

impl MemoryContainer {
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            fields: RequiredField::ALL.iter().copied().collect(),
            datasets: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn without_identifier(mut self) -> Self {
        self.identifier = None;
        self
    }

    #[must_use]
    pub fn without_field(mut self, field: RequiredField) -> Self {
        self.fields.remove(&field);
        self
    }

    /// Add a dataset and its annotation index row.
    #[must_use]
    pub fn with_dataset(
        mut self,
        category: Category,
        record: DatasetRecord,
        annotation: Option<RawString>,
    ) -> Self {
        self.annotations
            .entry(category)
            .or_default()
            .insert(record.name.clone(), annotation);
        self.datasets.entry(category).or_default().push(record);
        self
    }

    /// Add a dataset with no annotation index row.
    #[must_use]
    pub fn with_unindexed_dataset(mut self, category: Category, record: DatasetRecord) -> Self {
        self.datasets.entry(category).or_default().push(record);
        self
    }
}

impl RecordingContainer for MemoryContainer {
    fn identifier(&self) -> Option<String> {
        self.identifier.clone().filter(|id| !id.is_empty())
    }

    fn field_present(&self, field: RequiredField) -> bool {
        self.fields.contains(&field)
    }

    fn dataset_names(&self, category: Category) -> Result<Vec<String>, ValidateError> {
        Ok(self
            .datasets
            .get(&category)
            .map(|records| records.iter().map(|r| r.name.clone()).collect())
            .unwrap_or_default())
    }

    fn dataset(&self, category: Category, name: &str) -> Result<DatasetRecord, ValidateError> {
        self.datasets
            .get(&category)
            .and_then(|records| records.iter().find(|r| r.name == name))
            .cloned()
            .ok_or_else(|| ValidateError::MissingDataset {
                category,
                name: name.to_string(),
            })
    }

    fn annotation_index(&self, category: Category) -> Result<AnnotationIndex, ValidateError> {
        Ok(self.annotations.get(&category).cloned().unwrap_or_default())
    }
}

/// Opens [`MemoryContainer`]s registered under a path.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    containers: BTreeMap<PathBuf, MemoryContainer>,
}

impl MemoryOpener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, container: MemoryContainer) -> Self {
        self.containers.insert(path.into(), container);
        self
    }
}

impl ContainerOpener for MemoryOpener {
    type Container = MemoryContainer;

    fn open(&self, path: &Path) -> Result<MemoryContainer, ValidateError> {
        self.containers
            .get(path)
            .cloned()
            .ok_or_else(|| ValidateError::ContainerOpen {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            })
    }
}
