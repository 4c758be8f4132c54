//! NWB files read through libhdf5.

use std::path::Path;

use hdf5::types::{VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File, Group, H5Type, ObjectReference1, ReferencedObject};
use nwbqc_core::{Category, RawString, RequiredField};

use super::layout;
use crate::container::{AnnotationIndex, DatasetRecord, RecordingContainer};
use crate::error::ValidateError;

/// One row of a `TimeSeriesReferenceVectorData` column.
#[derive(H5Type, Clone, Debug)]
#[repr(C)]
struct TimeSeriesReference {
    idx_start: i32,
    count: i32,
    timeseries: ObjectReference1,
}

/// An NWB file opened read-only. Closed on drop.
pub struct NwbFile {
    file: File,
}

impl NwbFile {
    /// # Errors
    ///
    /// Returns [`ValidateError::ContainerOpen`] if the file is not readable HDF5.
    pub fn open(path: &Path) -> Result<Self, ValidateError> {
        let file = File::open(path).map_err(|e| ValidateError::ContainerOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { file })
    }

    fn group(&self, path: &str) -> Result<Group, ValidateError> {
        self.file.group(path).map_err(read_error(path))
    }

    fn reference_names(&self, column: &Dataset) -> Result<Vec<String>, ValidateError> {
        let rows = column
            .read_raw::<TimeSeriesReference>()
            .map_err(read_error(&column.name()))?;
        rows.iter()
            .map(|row| {
                let target = self
                    .file
                    .dereference(&row.timeseries)
                    .map_err(read_error(&column.name()))?;
                let path = match target {
                    ReferencedObject::Group(group) => group.name(),
                    ReferencedObject::Dataset(dataset) => dataset.name(),
                    _ => {
                        return Err(ValidateError::ContainerRead {
                            what: column.name(),
                            reason: "reference does not point to a time series".to_string(),
                        });
                    }
                };
                Ok(layout::object_name(&path).to_string())
            })
            .collect()
    }
}

fn read_error(what: &str) -> impl FnOnce(hdf5::Error) -> ValidateError + '_ {
    move |e| ValidateError::ContainerRead {
        what: what.to_string(),
        reason: e.to_string(),
    }
}

fn read_text(dataset: &Dataset) -> Option<String> {
    dataset
        .read_scalar::<VarLenUnicode>()
        .map(|s| s.as_str().to_string())
        .or_else(|_| dataset.read_scalar::<VarLenAscii>().map(|s| s.as_str().to_string()))
        .ok()
}

/// The annotation column of a recordings sub-table, if it has one.
fn read_annotations(table: &Group) -> Option<Vec<RawString>> {
    let column = table.dataset(layout::ANNOTATION_COLUMN).ok()?;
    if let Ok(values) = column.read_raw::<VarLenUnicode>() {
        return Some(values.iter().map(|v| RawString::from(v.as_str())).collect());
    }
    column
        .read_raw::<VarLenAscii>()
        .ok()
        .map(|values| values.iter().map(|v| RawString::Bytes(v.as_bytes().to_vec())).collect())
}

impl RecordingContainer for NwbFile {
    fn identifier(&self) -> Option<String> {
        self.file
            .dataset(layout::field_path(RequiredField::Identifier))
            .ok()
            .and_then(|dataset| read_text(&dataset))
            .filter(|id| !id.is_empty())
    }

    fn field_present(&self, field: RequiredField) -> bool {
        let Ok(dataset) = self.file.dataset(layout::field_path(field)) else {
            return false;
        };
        if dataset.is_scalar() {
            read_text(&dataset).is_none_or(|text| !text.is_empty())
        } else {
            dataset.size() > 0
        }
    }

    fn dataset_names(&self, category: Category) -> Result<Vec<String>, ValidateError> {
        let path = layout::category_group(category);
        let parent = path.split('/').next().unwrap_or(path);
        if !self.file.link_exists(parent) || !self.file.link_exists(path) {
            return Ok(Vec::new());
        }
        self.group(path)?.member_names().map_err(read_error(path))
    }

    fn dataset(&self, category: Category, name: &str) -> Result<DatasetRecord, ValidateError> {
        let path = format!("{}/{name}", layout::category_group(category));
        let group = self
            .file
            .group(&path)
            .map_err(|_| ValidateError::MissingDataset {
                category,
                name: name.to_string(),
            })?;

        let data = group
            .dataset("data")
            .and_then(|d| d.read_raw::<f64>())
            .map_err(read_error(&path))?;
        let rate = group
            .dataset("starting_time")
            .and_then(|d| d.attr("rate"))
            .and_then(|a| a.read_scalar::<f64>())
            .unwrap_or(0.0);
        let gain = group
            .dataset("gain")
            .and_then(|d| d.read_scalar::<f64>())
            .ok();
        let description = group
            .attr("description")
            .and_then(|a| a.read_scalar::<VarLenUnicode>())
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();

        Ok(DatasetRecord {
            name: name.to_string(),
            data,
            rate,
            gain,
            description,
        })
    }

    fn annotation_index(&self, category: Category) -> Result<AnnotationIndex, ValidateError> {
        let (table, column) = layout::recordings_table(category);
        let table_path = format!("{}/{table}", layout::INTRACELLULAR_RECORDINGS);
        let table = self.group(&table_path)?;
        let column = table
            .dataset(column)
            .map_err(read_error(&table_path))?;

        let names = self.reference_names(&column)?;
        let annotations = read_annotations(&table);

        let mut index = AnnotationIndex::new();
        for (row, name) in names.into_iter().enumerate() {
            let annotation = annotations.as_ref().and_then(|a| a.get(row).cloned());
            index.entry(name).or_insert(annotation);
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SWEEP: &str = "ccs__IDdepol__42";

    fn text(value: &str) -> VarLenUnicode {
        value.parse().unwrap()
    }

    fn write_text(group: &Group, name: &str, value: &str) -> hdf5::Result<()> {
        group
            .new_dataset::<VarLenUnicode>()
            .shape(())
            .create(name)?
            .write_scalar(&text(value))
    }

    fn write_texts(group: &Group, name: &str, values: &[&str]) -> hdf5::Result<()> {
        let values: Vec<VarLenUnicode> = values.iter().copied().map(text).collect();
        group
            .new_dataset_builder()
            .with_data(values.as_slice())
            .create(name)?;
        Ok(())
    }

    /// An NWB layout with one acquisition sweep, its response row and no
    /// stimulus presentation.
    fn write_nwb(path: &Path) -> hdf5::Result<()> {
        let file = File::create(path)?;
        write_text(&file, "identifier", "170106_2A-BJM")?;
        write_text(&file, "session_description", "")?;
        write_text(&file, "session_start_time", "2017-01-06T00:00:00")?;
        write_texts(&file, "file_create_date", &["2023-05-01T12:00:00"])?;

        let general = file.create_group("general")?;
        write_text(&general, "lab", "Cell Physiology")?;
        write_texts(&general, "experimenter", &["BJM"])?;

        let sweep = file.create_group("acquisition")?.create_group(SWEEP)?;
        sweep
            .new_attr::<VarLenUnicode>()
            .shape(())
            .create("description")?
            .write_scalar(&text("/170106_2A/ccs__IDdepol__42.ibw"))?;
        sweep
            .new_dataset_builder()
            .with_data(&[-70.0, -69.5, 12.25][..])
            .create("data")?;
        sweep
            .new_dataset::<f64>()
            .shape(())
            .create("starting_time")?
            .new_attr::<f64>()
            .shape(())
            .create("rate")?
            .write_scalar(&2000.0)?;
        sweep.new_dataset::<f64>().shape(()).create("gain")?.write_scalar(&0.5)?;

        file.create_group("stimulus")?;

        let responses = general
            .create_group("intracellular_ephys")?
            .create_group("intracellular_recordings")?
            .create_group("responses")?;
        let target = file.reference::<ObjectReference1>(&format!("acquisition/{SWEEP}"))?;
        let rows = [0, 1].map(|row| TimeSeriesReference {
            idx_start: row,
            count: 1,
            timeseries: target.clone(),
        });
        responses
            .new_dataset_builder()
            .with_data(&rows[..])
            .create(layout::recordings_table(Category::Acquisition).1)?;
        write_texts(&responses, layout::ANNOTATION_COLUMN, &["Stim: IDdepol", "later row"])?;
        Ok(())
    }

    fn open_fixture() -> (tempfile::TempDir, NwbFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("170106_2A-BJM.nwb");
        write_nwb(&path).unwrap();
        let file = NwbFile::open(&path).unwrap();
        (dir, file)
    }

    #[test]
    fn reads_the_identifier() {
        let (_dir, file) = open_fixture();
        assert_eq!(file.identifier().as_deref(), Some("170106_2A-BJM"));
    }

    #[test]
    fn empty_or_missing_fields_are_absent() {
        let (_dir, file) = open_fixture();

        for field in [
            RequiredField::Identifier,
            RequiredField::SessionStartTime,
            RequiredField::FileCreateDate,
            RequiredField::Lab,
            RequiredField::Experimenter,
        ] {
            assert!(file.field_present(field), "{field:?}");
        }
        for field in [
            RequiredField::SessionDescription,
            RequiredField::Slices,
            RequiredField::Institution,
        ] {
            assert!(!file.field_present(field), "{field:?}");
        }
    }

    #[test]
    fn lists_datasets_per_category() {
        let (_dir, file) = open_fixture();
        assert_eq!(file.dataset_names(Category::Acquisition).unwrap(), vec![SWEEP]);
        assert!(file.dataset_names(Category::Stimulus).unwrap().is_empty());
    }

    #[test]
    fn reads_a_sweep() {
        let (_dir, file) = open_fixture();

        let record = file.dataset(Category::Acquisition, SWEEP).unwrap();

        assert_eq!(record.name, SWEEP);
        assert_eq!(record.data, vec![-70.0, -69.5, 12.25]);
        assert_eq!(record.rate, 2000.0);
        assert_eq!(record.gain, Some(0.5));
        assert_eq!(record.description, "/170106_2A/ccs__IDdepol__42.ibw");
    }

    #[test]
    fn unknown_sweep_is_missing() {
        let (_dir, file) = open_fixture();
        assert!(matches!(
            file.dataset(Category::Acquisition, "nope"),
            Err(ValidateError::MissingDataset { category: Category::Acquisition, .. })
        ));
    }

    #[test]
    fn annotation_comes_from_the_first_referencing_row() {
        let (_dir, file) = open_fixture();

        let index = file.annotation_index(Category::Acquisition).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index[SWEEP], Some(RawString::from("Stim: IDdepol")));
    }

    #[test]
    fn missing_recordings_table_is_a_read_error() {
        let (_dir, file) = open_fixture();
        assert!(matches!(
            file.annotation_index(Category::Stimulus),
            Err(ValidateError::ContainerRead { .. })
        ));
    }

    #[test]
    fn non_hdf5_file_does_not_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.nwb");
        std::fs::write(&path, b"not hdf5").unwrap();

        assert!(matches!(
            NwbFile::open(&path),
            Err(ValidateError::ContainerOpen { .. })
        ));
    }
}
