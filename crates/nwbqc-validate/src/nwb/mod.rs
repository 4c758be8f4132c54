//! NWB (HDF5) converted files.
//!
//! Reading needs the `nwb` feature and a system HDF5 library. Without it
//! [`NwbOpener`] still exists but refuses to open files.

pub mod layout;
#[cfg(feature = "nwb")]
mod reader;

use std::path::Path;

use crate::container::ContainerOpener;
use crate::error::ValidateError;

#[cfg(feature = "nwb")]
pub use reader::NwbFile;

/// Whether this build can read NWB files.
pub const NWB_SUPPORT: bool = cfg!(feature = "nwb");

/// Opens `.nwb` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NwbOpener;

#[cfg(feature = "nwb")]
impl ContainerOpener for NwbOpener {
    type Container = NwbFile;

    fn open(&self, path: &Path) -> Result<NwbFile, ValidateError> {
        NwbFile::open(path)
    }
}

/// Stand-in container type of a build without HDF5; has no values.
#[cfg(not(feature = "nwb"))]
#[derive(Debug)]
pub enum NwbFile {}

#[cfg(not(feature = "nwb"))]
impl crate::container::RecordingContainer for NwbFile {
    fn identifier(&self) -> Option<String> {
        match *self {}
    }

    fn field_present(&self, _field: nwbqc_core::RequiredField) -> bool {
        match *self {}
    }

    fn dataset_names(&self, _category: nwbqc_core::Category) -> Result<Vec<String>, ValidateError> {
        match *self {}
    }

    fn dataset(
        &self,
        _category: nwbqc_core::Category,
        _name: &str,
    ) -> Result<crate::container::DatasetRecord, ValidateError> {
        match *self {}
    }

    fn annotation_index(
        &self,
        _category: nwbqc_core::Category,
    ) -> Result<crate::container::AnnotationIndex, ValidateError> {
        match *self {}
    }
}

#[cfg(not(feature = "nwb"))]
impl ContainerOpener for NwbOpener {
    type Container = NwbFile;

    fn open(&self, path: &Path) -> Result<NwbFile, ValidateError> {
        Err(ValidateError::ContainerOpen {
            path: path.to_path_buf(),
            reason: "built without NWB support; rebuild with the `nwb` feature".to_string(),
        })
    }
}

#[cfg(all(test, not(feature = "nwb")))]
mod tests {
    use super::*;

    #[test]
    fn opener_without_hdf5_refuses() {
        let err = NwbOpener.open(Path::new("170106_2A-BJM.nwb")).unwrap_err();
        assert!(matches!(
            err,
            ValidateError::ContainerOpen { reason, .. } if reason.contains("`nwb` feature")
        ));
    }
}
