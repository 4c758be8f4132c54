//! Locating and reading the original file of a dataset.

use std::path::{Path, PathBuf};

use nwbqc_core::RawString;
use nwbqc_igor::IgorWave;

use crate::error::ValidateError;

/// Leading description segments dropped when the direct path is missing.
///
/// Descriptions written on the acquisition machine carry its absolute
/// directory layout in front of the archive-relative path; this count only
/// matches that one layout.
pub const FALLBACK_SKIPPED_SEGMENTS: usize = 9;

/// Where a dataset's original file was looked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalLocation {
    pub path: PathBuf,
    /// Whether the description resolved directly, without the fallback.
    pub found_directly: bool,
}

/// Resolve a dataset description to a file under `extraction_dir`.
///
/// The description, stripped of leading and trailing `/`, is tried as a
/// relative path first. Otherwise its first [`FALLBACK_SKIPPED_SEGMENTS`]
/// segments are dropped. The fallback path is returned whether or not it
/// exists.
#[must_use]
pub fn locate_original(extraction_dir: &Path, description: &str) -> OriginalLocation {
    let relative = description.trim_matches('/');
    let direct = extraction_dir.join(relative);
    if direct.is_file() {
        return OriginalLocation {
            path: direct,
            found_directly: true,
        };
    }

    let remainder: PathBuf = relative
        .split('/')
        .skip(FALLBACK_SKIPPED_SEGMENTS)
        .filter(|segment| !segment.is_empty())
        .collect();
    let path = extraction_dir.join(remainder);
    tracing::debug!(description, fallback = %path.display(), "original file not at description path");
    OriginalLocation {
        path,
        found_directly: false,
    }
}

/// Header fields and signal of an original file.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalRecord {
    pub base_name: String,
    /// Sampling interval in seconds.
    pub dx: f64,
    pub annotation: RawString,
    pub data: Vec<f64>,
}

impl From<IgorWave> for OriginalRecord {
    fn from(wave: IgorWave) -> Self {
        let IgorWave { header, data } = wave;
        Self {
            annotation: header.annotation(),
            base_name: header.base_name,
            dx: header.dx,
            data,
        }
    }
}

/// Parses original files.
pub trait OriginalReader: Sync {
    /// # Errors
    ///
    /// Returns [`ValidateError::Original`] if the file cannot be read or parsed.
    fn read(&self, path: &Path) -> Result<OriginalRecord, ValidateError>;
}

/// Reads Igor binary waves.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgorReader;

impl OriginalReader for IgorReader {
    fn read(&self, path: &Path) -> Result<OriginalRecord, ValidateError> {
        nwbqc_igor::read_ibw(path)
            .map(OriginalRecord::from)
            .map_err(|source| ValidateError::Original {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn direct_path_strips_slashes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("170106_2A")).unwrap();
        std::fs::write(dir.path().join("170106_2A/ccs_42.ibw"), b"").unwrap();

        let location = locate_original(dir.path(), "/170106_2A/ccs_42.ibw/");
        assert_eq!(
            location,
            OriginalLocation {
                path: dir.path().join("170106_2A/ccs_42.ibw"),
                found_directly: true,
            }
        );
    }

    #[test]
    fn fallback_drops_nine_leading_segments() {
        let dir = tempfile::tempdir().unwrap();
        let description = "/1/2/3/4/5/6/7/8/9/170106_2A/ccs_42.ibw";

        let location = locate_original(dir.path(), description);
        assert_eq!(location.path, dir.path().join("170106_2A").join("ccs_42.ibw"));
        assert!(!location.found_directly);
    }

    #[test]
    fn short_description_falls_back_to_extraction_dir() {
        let dir = tempfile::tempdir().unwrap();
        let location = locate_original(dir.path(), "a/b");
        assert_eq!(location.path, dir.path().to_path_buf());
        assert!(!location.found_directly);
    }

    #[test]
    fn igor_reader_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.ibw");
        std::fs::write(&path, [0xff, 0xff, 0, 0]).unwrap();
        let err = IgorReader.read(&path).unwrap_err();
        assert!(matches!(err, ValidateError::Original { path: p, .. } if p == path));
    }
}
