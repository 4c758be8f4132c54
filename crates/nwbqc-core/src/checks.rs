//! Check-name enums for every result category.
//!
//! Each category of the result tree has a closed set of legal check names.
//! All enums use `snake_case` serialization, and `ALL` lists every variant in
//! the order results are produced.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SchemaError;

/// A closed set of check names for one result group.
pub trait CheckName:
    Copy + Ord + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + JsonSchema + 'static
{
    /// Every legal name in the group.
    const ALL: &'static [Self];

    /// Key of the group in the result tree.
    const GROUP: &'static str;

    fn as_str(self) -> &'static str;

    /// Error reported for a name outside the group.
    fn unregistered(name: &str) -> SchemaError;

    /// Parse a name, failing with the group's schema error.
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`] variant that belongs to this group when
    /// `name` is not registered.
    fn parse(name: &str) -> Result<Self, SchemaError> {
        Self::ALL
            .iter()
            .copied()
            .find(|check| check.as_str() == name)
            .ok_or_else(|| Self::unregistered(name))
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The two disjoint dataset collections of a converted file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Recorded responses.
    Acquisition,
    /// Applied inputs.
    Stimulus,
}

impl Category {
    pub const ALL: &'static [Self] = &[Self::Acquisition, Self::Stimulus];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Acquisition => "acquisition",
            Self::Stimulus => "stimulus",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DataCheck
// ---------------------------------------------------------------------------

/// Signal comparison checks (`data` group).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DataCheck {
    DataEqual,
}

impl CheckName for DataCheck {
    const ALL: &'static [Self] = &[Self::DataEqual];
    const GROUP: &'static str = "data";

    fn as_str(self) -> &'static str {
        match self {
            Self::DataEqual => "data_equal",
        }
    }

    fn unregistered(name: &str) -> SchemaError {
        SchemaError::UnregisteredDataCheck(name.to_string())
    }
}

impl fmt::Display for DataCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MetadataValidation
// ---------------------------------------------------------------------------

/// Metadata equality checks between the converted and original record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MetadataValidation {
    SamplingRatesClose,
    IgorHeaderCorrect,
    WavenotesEqual,
}

impl CheckName for MetadataValidation {
    const ALL: &'static [Self] = &[
        Self::SamplingRatesClose,
        Self::IgorHeaderCorrect,
        Self::WavenotesEqual,
    ];
    const GROUP: &'static str = "metadata_validation";

    fn as_str(self) -> &'static str {
        match self {
            Self::SamplingRatesClose => "sampling_rates_close",
            Self::IgorHeaderCorrect => "igor_header_correct",
            Self::WavenotesEqual => "wavenotes_equal",
        }
    }

    fn unregistered(name: &str) -> SchemaError {
        SchemaError::UnregisteredMetadata {
            group: Self::GROUP,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for MetadataValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MetadataVerification
// ---------------------------------------------------------------------------

/// Metadata presence checks on the converted dataset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MetadataVerification {
    WavenotesPresent,
    DescriptionPresent,
    SamplingRatePresent,
    GainPresent,
}

impl CheckName for MetadataVerification {
    const ALL: &'static [Self] = &[
        Self::WavenotesPresent,
        Self::DescriptionPresent,
        Self::SamplingRatePresent,
        Self::GainPresent,
    ];
    const GROUP: &'static str = "metadata_verification";

    fn as_str(self) -> &'static str {
        match self {
            Self::WavenotesPresent => "wavenotes_present",
            Self::DescriptionPresent => "description_present",
            Self::SamplingRatePresent => "sampling_rate_present",
            Self::GainPresent => "gain_present",
        }
    }

    fn unregistered(name: &str) -> SchemaError {
        SchemaError::UnregisteredMetadata {
            group: Self::GROUP,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for MetadataVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AdditionalTest
// ---------------------------------------------------------------------------

/// Auxiliary diagnostics that help whoever runs the conversion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalTest {
    IgorFilePresent,
}

impl CheckName for AdditionalTest {
    const ALL: &'static [Self] = &[Self::IgorFilePresent];
    const GROUP: &'static str = "additional_tests";

    fn as_str(self) -> &'static str {
        match self {
            Self::IgorFilePresent => "igor_file_present",
        }
    }

    fn unregistered(name: &str) -> SchemaError {
        SchemaError::UnregisteredTest(name.to_string())
    }
}

impl fmt::Display for AdditionalTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RequiredField
// ---------------------------------------------------------------------------

/// File-level metadata every converted file must carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    ExperimentDescription,
    FileCreateDate,
    Identifier,
    SessionDescription,
    SessionStartTime,
    TimestampsReferenceTime,
    Experimenter,
    Institution,
    Lab,
    Slices,
}

impl CheckName for RequiredField {
    const ALL: &'static [Self] = &[
        Self::ExperimentDescription,
        Self::FileCreateDate,
        Self::Identifier,
        Self::SessionDescription,
        Self::SessionStartTime,
        Self::TimestampsReferenceTime,
        Self::Experimenter,
        Self::Institution,
        Self::Lab,
        Self::Slices,
    ];
    const GROUP: &'static str = "metadata";

    fn as_str(self) -> &'static str {
        match self {
            Self::ExperimentDescription => "experiment_description",
            Self::FileCreateDate => "file_create_date",
            Self::Identifier => "identifier",
            Self::SessionDescription => "session_description",
            Self::SessionStartTime => "session_start_time",
            Self::TimestampsReferenceTime => "timestamps_reference_time",
            Self::Experimenter => "experimenter",
            Self::Institution => "institution",
            Self::Lab => "lab",
            Self::Slices => "slices",
        }
    }

    fn unregistered(name: &str) -> SchemaError {
        SchemaError::UnregisteredField(name.to_string())
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn serialized_names<K: CheckName>() -> Vec<String> {
        K::ALL
            .iter()
            .map(|check| serde_json::to_value(check).unwrap().as_str().unwrap().to_string())
            .collect()
    }

    fn as_str_names<K: CheckName>() -> Vec<String> {
        K::ALL.iter().map(|check| check.as_str().to_string()).collect()
    }

    #[test]
    fn serde_names_match_as_str() {
        assert_eq!(serialized_names::<DataCheck>(), as_str_names::<DataCheck>());
        assert_eq!(
            serialized_names::<MetadataValidation>(),
            as_str_names::<MetadataValidation>()
        );
        assert_eq!(
            serialized_names::<MetadataVerification>(),
            as_str_names::<MetadataVerification>()
        );
        assert_eq!(
            serialized_names::<AdditionalTest>(),
            as_str_names::<AdditionalTest>()
        );
        assert_eq!(
            serialized_names::<RequiredField>(),
            as_str_names::<RequiredField>()
        );
    }

    #[test]
    fn required_fields_are_the_ten_fixed_names() {
        assert_eq!(
            as_str_names::<RequiredField>(),
            vec![
                "experiment_description",
                "file_create_date",
                "identifier",
                "session_description",
                "session_start_time",
                "timestamps_reference_time",
                "experimenter",
                "institution",
                "lab",
                "slices",
            ]
        );
    }

    #[test]
    fn parse_accepts_registered_names() {
        assert_eq!(
            MetadataValidation::parse("wavenotes_equal"),
            Ok(MetadataValidation::WavenotesEqual)
        );
        assert_eq!(
            AdditionalTest::parse("igor_file_present"),
            Ok(AdditionalTest::IgorFilePresent)
        );
    }

    #[test]
    fn unregistered_metadata_and_tests_are_distinct() {
        assert_eq!(
            MetadataVerification::parse("units_present"),
            Err(SchemaError::UnregisteredMetadata {
                group: "metadata_verification",
                name: "units_present".to_string(),
            })
        );
        assert_eq!(
            AdditionalTest::parse("units_present"),
            Err(SchemaError::UnregisteredTest("units_present".to_string()))
        );
    }

    #[test]
    fn category_display() {
        assert_eq!(Category::Acquisition.to_string(), "acquisition");
        assert_eq!(Category::Stimulus.to_string(), "stimulus");
    }
}
