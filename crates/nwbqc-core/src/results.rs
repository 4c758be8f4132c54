//! The nested pass/fail result tree.
//!
//! ```text
//! {file_id: {metadata: {field: bool},
//!            datasets: {acquisition: {name: DatasetResult},
//!                       stimulus:    {name: DatasetResult}}}}
//! ```
//!
//! Every group is a [`Checks`] map keyed by a closed enum, so the only way to
//! meet an unregistered key is loading a saved tree. [`QcResults::from_json`]
//! audits the raw JSON first and reports such keys as a [`SchemaError`].

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checks::{
    AdditionalTest, Category, CheckName, DataCheck, MetadataValidation, MetadataVerification,
    RequiredField,
};
use crate::errors::{CoreError, SchemaError};
use crate::flatten::failed_check_paths;

/// Boolean outcomes for one group of checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
#[serde(bound(deserialize = "K: CheckName"))]
pub struct Checks<K>(BTreeMap<K, bool>);

impl<K: CheckName> Checks<K> {
    /// Evaluate every check of the group, in `K::ALL` order.
    pub fn evaluate(mut check: impl FnMut(K) -> bool) -> Self {
        Self(K::ALL.iter().map(|&name| (name, check(name))).collect())
    }

    #[must_use]
    pub fn get(&self, name: K) -> Option<bool> {
        self.0.get(&name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, bool)> + '_ {
        self.0.iter().map(|(name, passed)| (*name, *passed))
    }

    /// Names whose check evaluated to `false`.
    pub fn failed(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().filter(|(_, passed)| !passed).map(|(name, _)| name)
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.0.values().all(|passed| *passed)
    }

    /// Whether every name of the group has an outcome.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        K::ALL.iter().all(|name| self.0.contains_key(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// All check groups for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetResult {
    pub data: Checks<DataCheck>,
    pub metadata_verification: Checks<MetadataVerification>,
    pub metadata_validation: Checks<MetadataValidation>,
    pub additional_tests: Checks<AdditionalTest>,
}

impl DatasetResult {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.data.all_passed()
            && self.metadata_verification.all_passed()
            && self.metadata_validation.all_passed()
            && self.additional_tests.all_passed()
    }

    /// Total number of recorded checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.data.len()
            + self.metadata_verification.len()
            + self.metadata_validation.len()
            + self.additional_tests.len()
    }

    /// Failed checks as `group/check` strings.
    #[must_use]
    pub fn failed_checks(&self) -> Vec<String> {
        fn group<K: CheckName>(checks: &Checks<K>, out: &mut Vec<String>) {
            out.extend(checks.failed().map(|name| format!("{}/{name}", K::GROUP)));
        }

        let mut out = Vec::new();
        group(&self.data, &mut out);
        group(&self.metadata_verification, &mut out);
        group(&self.metadata_validation, &mut out);
        group(&self.additional_tests, &mut out);
        out
    }
}

/// Per-dataset results of one file, split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetResults {
    pub acquisition: BTreeMap<String, DatasetResult>,
    pub stimulus: BTreeMap<String, DatasetResult>,
}

impl DatasetResults {
    #[must_use]
    pub const fn category(&self, category: Category) -> &BTreeMap<String, DatasetResult> {
        match category {
            Category::Acquisition => &self.acquisition,
            Category::Stimulus => &self.stimulus,
        }
    }

    pub const fn category_mut(
        &mut self,
        category: Category,
    ) -> &mut BTreeMap<String, DatasetResult> {
        match category {
            Category::Acquisition => &mut self.acquisition,
            Category::Stimulus => &mut self.stimulus,
        }
    }

    #[must_use]
    pub fn dataset_count(&self) -> usize {
        self.acquisition.len() + self.stimulus.len()
    }
}

/// Results for one converted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileResult {
    pub metadata: Checks<RequiredField>,
    pub datasets: DatasetResults,
}

impl FileResult {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.metadata.all_passed()
            && Category::ALL
                .iter()
                .flat_map(|&category| self.datasets.category(category).values())
                .all(DatasetResult::all_passed)
    }

    /// Failed checks of this file as `a/b/c failed.` lines.
    #[must_use]
    pub fn failed_check_paths(&self) -> Vec<String> {
        serde_json::to_value(self).map_or_else(|_| Vec::new(), |tree| failed_check_paths(&tree))
    }

    /// Total number of recorded checks, file metadata included.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.metadata.len()
            + Category::ALL
                .iter()
                .flat_map(|&category| self.datasets.category(category).values())
                .map(DatasetResult::check_count)
                .sum::<usize>()
    }
}

/// Results of a batch, keyed by converted-file identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct QcResults(BTreeMap<String, FileResult>);

impl QcResults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the results of one file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateIdentifier`] if the identifier is
    /// already present; the existing entry is left untouched.
    pub fn insert(&mut self, file_id: String, result: FileResult) -> Result<(), CoreError> {
        if self.0.contains_key(&file_id) {
            return Err(CoreError::DuplicateIdentifier(file_id));
        }
        self.0.insert(file_id, result);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, file_id: &str) -> Option<&FileResult> {
        self.0.get(file_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileResult)> {
        self.0.iter().map(|(id, result)| (id.as_str(), result))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a saved tree, enforcing the check schema.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Schema`] for unregistered keys or bad nesting and
    /// [`CoreError::Json`] for invalid JSON.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let tree: Value = serde_json::from_str(json)?;
        audit_tree(&tree)?;
        Ok(serde_json::from_value(tree)?)
    }
}

/// Check every key of a raw results tree against the schema.
///
/// # Errors
///
/// Returns the [`SchemaError`] for the first offending key.
pub fn audit_tree(tree: &Value) -> Result<(), SchemaError> {
    for (file_id, file) in as_object(tree, "")? {
        let file = as_object(file, file_id)?;
        for (key, value) in file {
            let path = format!("{file_id}/{key}");
            match key.as_str() {
                "metadata" => audit_group::<RequiredField>(value, &path)?,
                "datasets" => audit_datasets(value, &path)?,
                _ => return Err(malformed(&path, "unexpected key")),
            }
        }
    }
    Ok(())
}

fn audit_datasets(value: &Value, path: &str) -> Result<(), SchemaError> {
    for (category, datasets) in as_object(value, path)? {
        let path = format!("{path}/{category}");
        if !Category::ALL.iter().any(|c| c.as_str() == category) {
            return Err(malformed(&path, "unknown dataset category"));
        }
        for (name, dataset) in as_object(datasets, &path)? {
            let path = format!("{path}/{name}");
            for (group, checks) in as_object(dataset, &path)? {
                let path = format!("{path}/{group}");
                match group.as_str() {
                    "data" => audit_group::<DataCheck>(checks, &path)?,
                    "metadata_verification" => {
                        audit_group::<MetadataVerification>(checks, &path)?;
                    }
                    "metadata_validation" => audit_group::<MetadataValidation>(checks, &path)?,
                    "additional_tests" => audit_group::<AdditionalTest>(checks, &path)?,
                    _ => return Err(malformed(&path, "unknown check group")),
                }
            }
        }
    }
    Ok(())
}

fn audit_group<K: CheckName>(value: &Value, path: &str) -> Result<(), SchemaError> {
    for (name, outcome) in as_object(value, path)? {
        K::parse(name)?;
        if !outcome.is_boolean() {
            return Err(malformed(&format!("{path}/{name}"), "outcome is not a boolean"));
        }
    }
    Ok(())
}

fn as_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a serde_json::Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| malformed(path, "expected an object"))
}

fn malformed(path: &str, reason: &str) -> SchemaError {
    SchemaError::Malformed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn dataset(data_equal: bool) -> DatasetResult {
        DatasetResult {
            data: Checks::evaluate(|_| data_equal),
            metadata_verification: Checks::evaluate(|_| true),
            metadata_validation: Checks::evaluate(|check| {
                check != MetadataValidation::WavenotesEqual
            }),
            additional_tests: Checks::evaluate(|_| true),
        }
    }

    #[test]
    fn evaluate_records_every_name() {
        let checks = Checks::<MetadataVerification>::evaluate(|_| true);
        assert!(checks.is_complete());
        assert_eq!(checks.len(), MetadataVerification::ALL.len());
    }

    #[test]
    fn failed_lists_false_outcomes_only() {
        let checks = Checks::<MetadataValidation>::evaluate(|check| {
            check == MetadataValidation::IgorHeaderCorrect
        });
        let failed: Vec<_> = checks.failed().collect();
        assert_eq!(
            failed,
            vec![
                MetadataValidation::SamplingRatesClose,
                MetadataValidation::WavenotesEqual
            ]
        );
        assert!(!checks.all_passed());
    }

    #[test]
    fn dataset_failed_checks_are_prefixed_with_group() {
        assert_eq!(
            dataset(false).failed_checks(),
            vec!["data/data_equal", "metadata_validation/wavenotes_equal"]
        );
        assert_eq!(dataset(true).check_count(), 9);
    }

    #[test]
    fn insert_rejects_duplicate_identifier() {
        let file = FileResult {
            metadata: Checks::evaluate(|_| true),
            datasets: DatasetResults::default(),
        };
        let mut results = QcResults::new();
        results.insert("cell-1".into(), file.clone()).unwrap();
        let err = results.insert("cell-1".into(), file).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateIdentifier(id) if id == "cell-1"));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn file_result_reports_failed_paths() {
        let mut datasets = DatasetResults::default();
        datasets
            .category_mut(Category::Stimulus)
            .insert("sweep1".into(), dataset(true));
        let file = FileResult {
            metadata: Checks::evaluate(|field| field != RequiredField::Lab),
            datasets,
        };
        assert!(!file.all_passed());
        assert_eq!(
            file.failed_check_paths(),
            vec![
                "datasets/stimulus/sweep1/metadata_validation/wavenotes_equal failed.",
                "metadata/lab failed.",
            ]
        );
        assert_eq!(file.check_count(), 19);
    }
}
