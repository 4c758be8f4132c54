//! Original archives: lookup, naming and extraction.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use nwbqc_core::Category;

use crate::container::RecordingContainer;
use crate::error::ValidateError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Return the first existing file among `base`, `base.tar` and `base.tgz`.
///
/// # Errors
///
/// Returns [`ValidateError::ArchiveNotFound`] if none exists.
pub fn resolve_archive(base: &Path) -> Result<PathBuf, ValidateError> {
    let with_suffix = |suffix: &str| {
        let mut name = OsString::from(base.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    };

    [base.to_path_buf(), with_suffix(".tar"), with_suffix(".tgz")]
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ValidateError::ArchiveNotFound {
            base: base.to_path_buf(),
        })
}

/// Unpack a tar archive into `dest`, gunzipping it first if compressed.
///
/// # Errors
///
/// Returns [`ValidateError::ArchiveExtract`] if the archive cannot be read or
/// unpacked.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<(), ValidateError> {
    let extract_error = |source| ValidateError::ArchiveExtract {
        archive: archive.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(extract_error)?;
    let mut reader = BufReader::new(file);
    let gzip = reader.fill_buf().map_err(extract_error)?.starts_with(&GZIP_MAGIC);

    let stream: Box<dyn Read> = if gzip {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };
    tar::Archive::new(stream).unpack(dest).map_err(extract_error)?;

    tracing::debug!(archive = %archive.display(), dest = %dest.display(), gzip, "archive extracted");
    Ok(())
}

/// Archive name encoded in a dataset description.
///
/// The second-to-last `/`-separated segment; when it contains `Folder`, only
/// the part before the first space.
#[must_use]
pub fn derive_archive_name(description: &str) -> Option<String> {
    let segments: Vec<&str> = description.split('/').collect();
    let name = segments.len().checked_sub(2).map(|i| segments[i])?;
    let name = if name.contains("Folder") {
        name.split(' ').next().unwrap_or(name)
    } else {
        name
    };
    Some(name.to_string())
}

// ---------------------------------------------------------------------------
// ArchiveMap
// ---------------------------------------------------------------------------

/// Mapping from converted-file stem to archive name.
///
/// Loaded from a headerless two-column CSV (`<nwb stem>,<archive name>`).
/// The first row for a stem wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveMap(BTreeMap<String, String>);

impl ArchiveMap {
    /// Read a mapping file.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Io`] if the file cannot be opened, or
    /// [`ValidateError::MapParse`] for a malformed row.
    pub fn load(path: &Path) -> Result<Self, ValidateError> {
        let file = File::open(path).map_err(|source| {
            ValidateError::io(format!("failed to read {}", path.display()), source)
        })?;
        Self::from_reader(file, path)
    }

    /// Parse mapping rows; `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::MapParse`] naming the 1-based line of the
    /// first malformed row.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ValidateError> {
        Self::from_reader(text.as_bytes(), origin)
    }

    fn from_reader(reader: impl Read, origin: &Path) -> Result<Self, ValidateError> {
        let parse_error = |line: Option<&csv::Position>, reason: String| ValidateError::MapParse {
            path: origin.to_path_buf(),
            line: line.map_or(0, |pos| usize::try_from(pos.line()).unwrap_or(usize::MAX)),
            reason,
        };

        let mut rows = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut map = BTreeMap::new();
        for result in rows.records() {
            let record = result.map_err(|e| parse_error(e.position(), e.to_string()))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let (Some(stem), Some(archive)) = (record.get(0), record.get(1)) else {
                return Err(parse_error(
                    record.position(),
                    "expected `<nwb>,<archive>`".to_string(),
                ));
            };
            map.entry(stem.to_string())
                .or_insert_with(|| archive.to_string());
        }
        Ok(Self(map))
    }

    /// Archive name for a converted-file stem.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::MissingMapping`] if the stem is not mapped.
    pub fn lookup(&self, stem: &str) -> Result<&str, ValidateError> {
        self.0
            .get(stem)
            .map(String::as_str)
            .ok_or_else(|| ValidateError::MissingMapping {
                stem: stem.to_string(),
            })
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

// ---------------------------------------------------------------------------
// ArchiveLocator
// ---------------------------------------------------------------------------

/// Finds the original archive of a converted file under one directory.
#[derive(Debug, Clone)]
pub struct ArchiveLocator {
    igor_dir: PathBuf,
    map: Option<ArchiveMap>,
}

impl ArchiveLocator {
    /// Without a map, archive names are derived from the first acquisition
    /// dataset's description.
    #[must_use]
    pub const fn new(igor_dir: PathBuf, map: Option<ArchiveMap>) -> Self {
        Self { igor_dir, map }
    }

    /// Resolve the archive for the converted file at `nwb_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::MissingMapping`],
    /// [`ValidateError::ArchiveName`] or [`ValidateError::ArchiveNotFound`].
    pub fn locate(
        &self,
        nwb_path: &Path,
        container: &impl RecordingContainer,
    ) -> Result<PathBuf, ValidateError> {
        let name = match &self.map {
            Some(map) => {
                let stem = nwb_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                map.lookup(&stem)?.to_string()
            }
            None => Self::derived_name(container)?,
        };
        let archive = resolve_archive(&self.igor_dir.join(&name))?;
        tracing::debug!(nwb = %nwb_path.display(), archive = %archive.display(), "archive resolved");
        Ok(archive)
    }

    fn derived_name(container: &impl RecordingContainer) -> Result<String, ValidateError> {
        let names = container.dataset_names(Category::Acquisition)?;
        let first = names
            .first()
            .ok_or_else(|| ValidateError::ArchiveName(String::new()))?;
        let description = container.dataset(Category::Acquisition, first)?.description;
        derive_archive_name(&description).ok_or(ValidateError::ArchiveName(description))
    }
}
