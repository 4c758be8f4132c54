//! Lifecycle of one converted file: connect, extract, validate, close.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use nwbqc_core::{Category, Checks, DatasetResults, FileResult, RawString, RequiredField};

use crate::archive::{ArchiveLocator, extract_archive};
use crate::container::{ContainerOpener, RecordingContainer};
use crate::dataset::DatasetValidator;
use crate::error::{FileError, Stage, ValidateError};
use crate::original::OriginalReader;

// ---------------------------------------------------------------------------
// ExtractionDir
// ---------------------------------------------------------------------------

/// Extraction directories owned by a live [`ExtractionDir`] in this process.
static CLAIMED: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

fn claimed() -> MutexGuard<'static, HashSet<PathBuf>> {
    CLAIMED
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive ownership of one extraction path, released on drop.
#[derive(Debug)]
struct Claim(PathBuf);

impl Claim {
    fn acquire(path: &Path) -> Result<Self, ValidateError> {
        if claimed().insert(path.to_path_buf()) {
            Ok(Self(path.to_path_buf()))
        } else {
            Err(ValidateError::ScratchInUse {
                path: path.to_path_buf(),
            })
        }
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        claimed().remove(&self.0);
    }
}

/// Per-file scratch directory, removed when dropped.
///
/// [`ExtractionDir::remove`] removes it explicitly and reports failures;
/// otherwise `Drop` removes it and only logs.
#[derive(Debug)]
pub struct ExtractionDir {
    path: PathBuf,
    removed: bool,
    _claim: Claim,
}

impl ExtractionDir {
    /// Create an empty directory at `path`.
    ///
    /// Only one `ExtractionDir` per path may be alive in a process. A
    /// directory already at an unclaimed `path` is left over from an
    /// interrupted run; it is deleted first so its contents are never mixed
    /// with this run's.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::ScratchInUse`] without touching the disk if
    /// another `ExtractionDir` owns `path`, and [`ValidateError::Io`] if the
    /// directory cannot be prepared.
    pub fn create(path: PathBuf) -> Result<Self, ValidateError> {
        let claim = Claim::acquire(&path)?;
        if path.exists() {
            tracing::warn!(path = %path.display(), "removing stale extraction directory");
            std::fs::remove_dir_all(&path).map_err(|source| {
                ValidateError::io(format!("failed to remove stale {}", path.display()), source)
            })?;
        }
        std::fs::create_dir_all(&path).map_err(|source| {
            ValidateError::io(format!("failed to create {}", path.display()), source)
        })?;
        Ok(Self {
            path,
            removed: false,
            _claim: claim,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    ///
    /// Returns [`ValidateError::Io`] if the directory cannot be deleted.
    pub fn remove(mut self) -> Result<(), ValidateError> {
        self.removed = true;
        std::fs::remove_dir_all(&self.path).map_err(|source| {
            ValidateError::io(format!("failed to remove {}", self.path.display()), source)
        })
    }
}

impl Drop for ExtractionDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(error) = std::fs::remove_dir_all(&self.path)
            && error.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), %error, "failed to remove extraction directory");
        }
    }
}

// ---------------------------------------------------------------------------
// FileValidator
// ---------------------------------------------------------------------------

/// Validates one converted file against its original archive.
///
/// Steps run in order: [`connect`](Self::connect),
/// [`extract_archive`](Self::extract_archive), then
/// [`verify_file_metadata`](Self::verify_file_metadata) and
/// [`validate_datasets`](Self::validate_datasets), and finally
/// [`close`](Self::close). The extraction directory is removed on every path
/// out, including errors and panics.
pub struct FileValidator<'a, C, R> {
    nwb_path: PathBuf,
    scratch_root: &'a Path,
    reader: &'a R,
    container: Option<C>,
    file_id: Option<String>,
    extraction: Option<ExtractionDir>,
}

impl<'a, C: RecordingContainer, R: OriginalReader> FileValidator<'a, C, R> {
    #[must_use]
    pub fn new(nwb_path: impl Into<PathBuf>, scratch_root: &'a Path, reader: &'a R) -> Self {
        Self {
            nwb_path: nwb_path.into(),
            scratch_root,
            reader,
            container: None,
            file_id: None,
            extraction: None,
        }
    }

    #[must_use]
    pub fn nwb_path(&self) -> &Path {
        &self.nwb_path
    }

    /// The identifier read by [`connect`](Self::connect).
    #[must_use]
    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    /// The extraction directory, once the archive is extracted.
    #[must_use]
    pub fn extraction_dir(&self) -> Option<&Path> {
        self.extraction.as_ref().map(ExtractionDir::path)
    }

    /// Open the converted file and read its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::ContainerOpen`],
    /// [`ValidateError::MissingIdentifier`], or
    /// [`ValidateError::InvalidState`] when already connected.
    pub fn connect<O>(&mut self, opener: &O) -> Result<(), ValidateError>
    where
        O: ContainerOpener<Container = C>,
    {
        if self.container.is_some() {
            return Err(ValidateError::InvalidState {
                operation: "connect",
                reason: "already connected",
            });
        }
        let container = opener.open(&self.nwb_path)?;
        let file_id = container
            .identifier()
            .ok_or_else(|| ValidateError::MissingIdentifier {
                path: self.nwb_path.clone(),
            })?;
        tracing::info!(path = %self.nwb_path.display(), file_id = %file_id, "converted file opened");
        self.file_id = Some(file_id);
        self.container = Some(container);
        Ok(())
    }

    /// Unpack `archive` into `<scratch_root>/<identifier>`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::InvalidState`] before
    /// [`connect`](Self::connect) or after a previous extraction,
    /// [`ValidateError::UnsafeIdentifier`] for an identifier that is not a
    /// plain file name, [`ValidateError::ScratchInUse`] while another
    /// validator owns the same directory, and extraction or I/O errors
    /// otherwise.
    pub fn extract_archive(&mut self, archive: &Path) -> Result<(), ValidateError> {
        let Some(file_id) = self.file_id.as_deref() else {
            return Err(ValidateError::InvalidState {
                operation: "extract archive",
                reason: "not connected",
            });
        };
        if self.extraction.is_some() {
            return Err(ValidateError::InvalidState {
                operation: "extract archive",
                reason: "already extracted",
            });
        }

        let dir = ExtractionDir::create(self.scratch_root.join(scratch_name(file_id)?))?;
        let dest = dir.path().to_path_buf();
        self.extraction = Some(dir);
        extract_archive(archive, &dest)?;
        tracing::info!(archive = %archive.display(), dest = %dest.display(), "original archive extracted");
        Ok(())
    }

    /// One outcome per required file-level field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::InvalidState`] before
    /// [`connect`](Self::connect).
    pub fn verify_file_metadata(&self) -> Result<Checks<RequiredField>, ValidateError> {
        let container = self.container("verify file metadata")?;
        Ok(Checks::evaluate(|field| container.field_present(field)))
    }

    /// Validate every dataset of both categories.
    ///
    /// # Errors
    ///
    /// Aborts on the first duplicate dataset name, dataset without an
    /// annotation row, or unreadable original file.
    pub fn validate_datasets(&self) -> Result<DatasetResults, ValidateError> {
        let container = self.container("validate datasets")?;
        let extraction_dir = self.extraction_dir().ok_or(ValidateError::InvalidState {
            operation: "validate datasets",
            reason: "archive not extracted",
        })?;

        let mut results = DatasetResults::default();
        for &category in Category::ALL {
            let names = container.dataset_names(category)?;
            if names.is_empty() {
                continue;
            }
            let index = container.annotation_index(category)?;
            for name in names {
                if results.category(category).contains_key(&name) {
                    return Err(ValidateError::DuplicateDataset { category, name });
                }
                let annotation = index
                    .get(&name)
                    .ok_or_else(|| ValidateError::MissingAnnotationRow {
                        category,
                        name: name.clone(),
                    })?
                    .clone()
                    .map_or_else(String::new, RawString::into_text_or_empty);

                let record = container.dataset(category, &name)?;
                let result = DatasetValidator::new(&record, extraction_dir, self.reader)?
                    .run(&annotation);
                tracing::debug!(%category, dataset = %name, passed = result.all_passed(), "dataset validated");
                results.category_mut(category).insert(name, result);
            }
        }
        Ok(results)
    }

    /// Close the converted file and delete the extraction directory.
    ///
    /// Later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Io`] if the directory cannot be deleted.
    pub fn close(&mut self) -> Result<(), ValidateError> {
        self.container = None;
        match self.extraction.take() {
            Some(dir) => dir.remove(),
            None => Ok(()),
        }
    }

    /// Run every step and close, locating the archive with `archives`.
    ///
    /// # Errors
    ///
    /// Returns a [`FileError`] naming the step that failed. The extraction
    /// directory is removed either way.
    pub fn run<O>(
        mut self,
        opener: &O,
        archives: &ArchiveLocator,
    ) -> Result<(String, FileResult), FileError>
    where
        O: ContainerOpener<Container = C>,
    {
        let outcome = self.run_steps(opener, archives);
        let cleanup = self.close();
        match (outcome, cleanup) {
            (Ok(result), Ok(())) => Ok(result),
            (Ok(_), Err(error)) => Err(self.fail(Stage::Cleanup, error)),
            (Err(error), cleanup) => {
                if let Err(cleanup_error) = cleanup {
                    tracing::warn!(%cleanup_error, "cleanup after failed validation also failed");
                }
                Err(error)
            }
        }
    }

    fn run_steps<O>(
        &mut self,
        opener: &O,
        archives: &ArchiveLocator,
    ) -> Result<(String, FileResult), FileError>
    where
        O: ContainerOpener<Container = C>,
    {
        self.connect(opener).map_err(|e| self.fail(Stage::Connect, e))?;

        let archive = self
            .container("locate archive")
            .and_then(|container| archives.locate(&self.nwb_path, container))
            .map_err(|e| self.fail(Stage::Resolve, e))?;

        self.extract_archive(&archive)
            .map_err(|e| self.fail(Stage::Extract, e))?;

        let metadata = self
            .verify_file_metadata()
            .map_err(|e| self.fail(Stage::Validate, e))?;
        let datasets = self
            .validate_datasets()
            .map_err(|e| self.fail(Stage::Validate, e))?;

        let result = FileResult { metadata, datasets };
        let file_id = self.file_id.clone().unwrap_or_default();
        tracing::info!(
            file_id = %file_id,
            datasets = result.datasets.dataset_count(),
            passed = result.all_passed(),
            "file validated"
        );
        Ok((file_id, result))
    }

    fn container(&self, operation: &'static str) -> Result<&C, ValidateError> {
        self.container.as_ref().ok_or(ValidateError::InvalidState {
            operation,
            reason: "not connected",
        })
    }

    fn fail(&self, stage: Stage, source: ValidateError) -> FileError {
        FileError {
            path: self.nwb_path.clone(),
            file_id: self.file_id.clone(),
            stage,
            source,
        }
    }
}

/// The identifier as a single directory name under the scratch root.
fn scratch_name(file_id: &str) -> Result<&str, ValidateError> {
    let mut components = Path::new(file_id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name.to_str() == Some(file_id) => Ok(file_id),
        _ => Err(ValidateError::UnsafeIdentifier {
            file_id: file_id.to_string(),
        }),
    }
}
