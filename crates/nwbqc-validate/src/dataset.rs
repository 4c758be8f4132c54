//! Checks for one dataset against its original file.

use std::path::Path;

use nwbqc_core::{
    AdditionalTest, Checks, DataCheck, DatasetResult, MetadataValidation, MetadataVerification,
};

use crate::container::DatasetRecord;
use crate::error::ValidateError;
use crate::original::{OriginalReader, OriginalRecord, locate_original};

/// Relative tolerance of [`is_close`].
pub const RTOL: f64 = 1e-5;
/// Absolute tolerance of [`is_close`].
pub const ATOL: f64 = 1e-8;

/// Exact element-wise equality with `NaN` equal to `NaN`.
///
/// Arrays of different lengths are never equal.
#[must_use]
pub fn data_equal(converted: &[f64], original: &[f64]) -> bool {
    converted.len() == original.len()
        && converted
            .iter()
            .zip(original)
            .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
}

/// `|a - b| <= ATOL + RTOL * |b|`.
///
/// Infinities are close only to themselves; `NaN` is close to nothing.
#[must_use]
pub fn is_close(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= RTOL.mul_add(b.abs(), ATOL)
}

/// One converted dataset paired with its parsed original.
#[derive(Debug)]
pub struct DatasetValidator<'a> {
    record: &'a DatasetRecord,
    original: OriginalRecord,
    original_annotation: String,
    igor_file_present: bool,
}

impl<'a> DatasetValidator<'a> {
    /// Locate and parse the original file of `record` under `extraction_dir`.
    ///
    /// # Errors
    ///
    /// Returns the reader's error if the original file (after fallback)
    /// cannot be read.
    pub fn new(
        record: &'a DatasetRecord,
        extraction_dir: &Path,
        reader: &impl OriginalReader,
    ) -> Result<Self, ValidateError> {
        let location = locate_original(extraction_dir, &record.description);
        let original = reader.read(&location.path)?;
        Ok(Self::from_parts(record, original, location.found_directly))
    }

    #[must_use]
    pub fn from_parts(
        record: &'a DatasetRecord,
        original: OriginalRecord,
        igor_file_present: bool,
    ) -> Self {
        let original_annotation = original.annotation.clone().into_text_or_empty();
        Self {
            record,
            original,
            original_annotation,
            igor_file_present,
        }
    }

    #[must_use]
    pub fn validate_signal(&self) -> Checks<DataCheck> {
        Checks::evaluate(|check| match check {
            DataCheck::DataEqual => data_equal(&self.record.data, &self.original.data),
        })
    }

    /// Compare converted metadata with the original header.
    #[must_use]
    pub fn validate_metadata(&self, annotation: &str) -> Checks<MetadataValidation> {
        Checks::evaluate(|check| match check {
            MetadataValidation::SamplingRatesClose => {
                is_close(self.record.rate, 1.0 / self.original.dx)
            }
            MetadataValidation::IgorHeaderCorrect => {
                self.record.description.contains(&self.original.base_name)
            }
            MetadataValidation::WavenotesEqual => self.original_annotation == annotation,
        })
    }

    /// Presence checks on the converted dataset.
    #[must_use]
    pub fn verify_metadata(&self, annotation: &str) -> Checks<MetadataVerification> {
        Checks::evaluate(|check| match check {
            // An empty converted annotation is fine when the original had none.
            MetadataVerification::WavenotesPresent => {
                !annotation.is_empty() || self.original_annotation.is_empty()
            }
            MetadataVerification::DescriptionPresent => !self.record.description.is_empty(),
            MetadataVerification::SamplingRatePresent => self.record.rate != 0.0,
            MetadataVerification::GainPresent => self.record.gain.is_some_and(|g| g != 0.0),
        })
    }

    #[must_use]
    pub fn additional_tests(&self) -> Checks<AdditionalTest> {
        Checks::evaluate(|check| match check {
            AdditionalTest::IgorFilePresent => self.igor_file_present,
        })
    }

    /// Every check group, given the converted annotation.
    #[must_use]
    pub fn run(&self, annotation: &str) -> DatasetResult {
        DatasetResult {
            data: self.validate_signal(),
            metadata_verification: self.verify_metadata(annotation),
            metadata_validation: self.validate_metadata(annotation),
            additional_tests: self.additional_tests(),
        }
    }
}
