//! Validating many converted files in parallel.

use std::path::{Path, PathBuf};

use nwbqc_core::{FileResult, QcResults};
use rayon::prelude::*;

use crate::archive::ArchiveLocator;
use crate::container::ContainerOpener;
use crate::error::{FileError, Stage, ValidateError};
use crate::file::FileValidator;
use crate::original::OriginalReader;

/// Everything needed to validate converted files of one batch.
#[derive(Debug, Clone)]
pub struct QcSession<O, R> {
    pub opener: O,
    pub reader: R,
    pub archives: ArchiveLocator,
    /// Parent of every per-file extraction directory.
    pub scratch_root: PathBuf,
}

/// Merged results of a batch plus the files that failed fatally.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: QcResults,
    pub failures: Vec<FileError>,
}

impl BatchOutcome {
    /// Whether every file produced results. Failed checks do not count.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Add one file's outcome; a repeated identifier becomes a failure.
    pub fn merge(&mut self, path: &Path, outcome: Result<(String, FileResult), FileError>) {
        match outcome {
            Ok((file_id, result)) => {
                if let Err(error) = self.results.insert(file_id.clone(), result) {
                    tracing::error!(path = %path.display(), file_id = %file_id, "duplicate identifier in batch");
                    self.failures.push(FileError {
                        path: path.to_path_buf(),
                        file_id: Some(file_id),
                        stage: Stage::Merge,
                        source: error.into(),
                    });
                }
            }
            Err(error) => {
                tracing::error!(%error, "file validation failed");
                self.failures.push(error);
            }
        }
    }
}

impl<O: ContainerOpener, R: OriginalReader> QcSession<O, R> {
    /// Validate one converted file.
    ///
    /// # Errors
    ///
    /// Returns the file's [`FileError`]; nothing is left in the scratch root.
    pub fn validate_file(&self, nwb_path: &Path) -> Result<(String, FileResult), FileError> {
        FileValidator::new(nwb_path, &self.scratch_root, &self.reader)
            .run(&self.opener, &self.archives)
    }

    /// Validate `paths` on `jobs` worker threads (0 = one per core).
    ///
    /// `on_done` is called once per file as soon as it finishes, from the
    /// worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::WorkerPool`] if the pool cannot be built.
    /// Per-file errors are collected in [`BatchOutcome::failures`].
    pub fn validate_batch<F>(
        &self,
        paths: &[PathBuf],
        jobs: usize,
        on_done: F,
    ) -> Result<BatchOutcome, ValidateError>
    where
        F: Fn(&Path) + Sync,
    {
        tracing::debug!(
            scratch_root = %self.scratch_root.display(),
            "an interrupted run leaves its extraction directories under the scratch root"
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| ValidateError::WorkerPool(e.to_string()))?;
        tracing::info!(files = paths.len(), threads = pool.current_num_threads(), "batch started");

        let outcomes: Vec<_> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let outcome = self.validate_file(path);
                    on_done(path);
                    (path, outcome)
                })
                .collect()
        });

        let mut batch = BatchOutcome::default();
        for (path, outcome) in outcomes {
            batch.merge(path, outcome);
        }
        tracing::info!(
            validated = batch.results.len(),
            failed = batch.failures.len(),
            "batch finished"
        );
        Ok(batch)
    }
}

/// Every `*.nwb` file directly inside `dir`, sorted.
///
/// # Errors
///
/// Returns [`ValidateError::Io`] if the directory cannot be listed.
pub fn discover_nwb_files(dir: &Path) -> Result<Vec<PathBuf>, ValidateError> {
    let list_error =
        |source| ValidateError::io(format!("failed to list {}", dir.display()), source);
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "nwb") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
