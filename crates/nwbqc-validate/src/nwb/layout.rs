//! HDF5 paths of the NWB objects the validators read.

use nwbqc_core::{Category, RequiredField};

/// Table pairing every response with its stimulus.
pub const INTRACELLULAR_RECORDINGS: &str = "general/intracellular_ephys/intracellular_recordings";

/// Per-row annotation column added by the lab's icephys extension.
pub const ANNOTATION_COLUMN: &str = "wavenote_original";

/// Path of a required file-level field.
#[must_use]
pub const fn field_path(field: RequiredField) -> &'static str {
    match field {
        RequiredField::ExperimentDescription => "general/experiment_description",
        RequiredField::FileCreateDate => "file_create_date",
        RequiredField::Identifier => "identifier",
        RequiredField::SessionDescription => "session_description",
        RequiredField::SessionStartTime => "session_start_time",
        RequiredField::TimestampsReferenceTime => "timestamps_reference_time",
        RequiredField::Experimenter => "general/experimenter",
        RequiredField::Institution => "general/institution",
        RequiredField::Lab => "general/lab",
        RequiredField::Slices => "general/slices",
    }
}

/// Group holding the datasets of a category.
#[must_use]
pub const fn category_group(category: Category) -> &'static str {
    match category {
        Category::Acquisition => "acquisition",
        Category::Stimulus => "stimulus/presentation",
    }
}

/// Sub-table of [`INTRACELLULAR_RECORDINGS`] referencing a category's
/// datasets, and the reference column inside it.
#[must_use]
pub const fn recordings_table(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Acquisition => ("responses", "response"),
        Category::Stimulus => ("stimuli", "stimulus"),
    }
}

/// Final component of an HDF5 object path.
#[must_use]
pub fn object_name(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}
