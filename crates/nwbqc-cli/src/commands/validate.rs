use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use nwbqc_config::QcConfig;
use nwbqc_validate::nwb::{NWB_SUPPORT, NwbOpener};
use nwbqc_validate::{
    ArchiveLocator, ArchiveMap, ContainerOpener, FileError, IgorReader, OriginalReader, QcSession,
    discover_nwb_files,
};
use serde::Serialize;

use crate::cli::{GlobalFlags, ValidateArgs};
use crate::output::output;
use crate::progress::Progress;
use crate::report;

/// Config values after command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    nwb_dir: PathBuf,
    igor_dir: PathBuf,
    mapfile: Option<PathBuf>,
    scratch_root: PathBuf,
    output_dir: PathBuf,
    postfix: String,
    jobs: usize,
    write_report: bool,
}

impl Settings {
    fn resolve(config: &QcConfig, args: &ValidateArgs) -> anyhow::Result<Self> {
        let required = |flag: Option<&PathBuf>, configured: &str, name: &str| {
            match flag {
                Some(path) => Ok(path.clone()),
                None if !configured.is_empty() => Ok(PathBuf::from(configured)),
                None => Err(anyhow::anyhow!(
                    "no {name} directory given; pass --{name}-dir or set paths.{name}_dir"
                )),
            }
        };

        Ok(Self {
            nwb_dir: required(args.nwb_dir.as_ref(), &config.paths.nwb_dir, "nwb")?,
            igor_dir: required(args.igor_dir.as_ref(), &config.paths.igor_dir, "igor")?,
            mapfile: args.mapfile.clone().or_else(|| config.paths.mapfile()),
            scratch_root: config.paths.scratch_root(),
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| config.paths.output_root()),
            postfix: args
                .postfix
                .clone()
                .unwrap_or_else(|| config.batch.postfix.clone()),
            jobs: args.jobs.unwrap_or(config.batch.jobs),
            write_report: config.report.write_text && !args.no_report,
        })
    }
}

#[derive(Debug, Serialize)]
struct FailureRow {
    path: String,
    file_id: Option<String>,
    stage: String,
    error: String,
}

impl From<&FileError> for FailureRow {
    fn from(error: &FileError) -> Self {
        Self {
            path: error.path.display().to_string(),
            file_id: error.file_id.clone(),
            stage: error.stage.to_string(),
            error: error.source.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    files: usize,
    passed: usize,
    with_failed_checks: usize,
    aborted: usize,
    results_file: String,
    report_file: Option<String>,
    failures: Vec<FailureRow>,
}

/// Handle `nwbqc validate`.
pub fn handle(args: &ValidateArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    ensure_nwb_support()?;
    let config = QcConfig::load_with_dotenv().context("failed to load nwbqc configuration")?;
    let settings = Settings::resolve(&config, args)?;

    let map = settings
        .mapfile
        .as_deref()
        .map(ArchiveMap::load)
        .transpose()
        .context("failed to load the archive mapping file")?;
    if let Some(map) = &map {
        tracing::info!(entries = map.len(), "archive mapping loaded");
    }

    let session = QcSession {
        opener: NwbOpener,
        reader: IgorReader,
        archives: ArchiveLocator::new(settings.igor_dir.clone(), map),
        scratch_root: settings.scratch_root.clone(),
    };

    let summary = run(&session, &settings)?;
    output(&summary, flags.format)?;

    if summary.aborted > 0 {
        bail!(
            "{} of {} file(s) could not be validated",
            summary.aborted,
            summary.files
        );
    }
    Ok(())
}

/// Fail before any file is touched when NWB files cannot be read.
fn ensure_nwb_support() -> anyhow::Result<()> {
    if !NWB_SUPPORT {
        bail!(
            "this nwbqc build cannot read NWB files; rebuild with `--features nwb` \
             (needs a system HDF5 library)"
        );
    }
    Ok(())
}

fn run<O, R>(session: &QcSession<O, R>, settings: &Settings) -> anyhow::Result<RunSummary>
where
    O: ContainerOpener,
    R: OriginalReader,
{
    let paths = discover_nwb_files(&settings.nwb_dir)
        .with_context(|| format!("failed to scan {}", settings.nwb_dir.display()))?;
    if paths.is_empty() {
        tracing::warn!(dir = %settings.nwb_dir.display(), "no .nwb files found");
    }

    let progress = Progress::bar(paths.len() as u64, "validating");
    let outcome = session
        .validate_batch(&paths, settings.jobs, |path| {
            progress.set_message(&file_label(path));
            progress.inc(1);
        })
        .context("failed to start the validation workers")?;
    if outcome.is_complete() {
        progress.finish_ok("done");
    } else {
        progress.finish_err("finished with errors");
    }

    std::fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("failed to create {}", settings.output_dir.display()))?;

    let results_file = settings
        .output_dir
        .join(report::results_file_name(&settings.postfix));
    let json = outcome
        .results
        .to_json_pretty()
        .context("failed to serialize results")?;
    std::fs::write(&results_file, json)
        .with_context(|| format!("failed to write {}", results_file.display()))?;
    tracing::info!(results = %results_file.display(), "results written");

    let report_file = if settings.write_report {
        let path = report::report_path(&settings.output_dir, &settings.postfix);
        let text = report::render(
            &outcome.results,
            &outcome.failures,
            &settings.postfix,
            chrono::Local::now(),
        );
        std::fs::write(&path, text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(report = %path.display(), "report written");
        Some(path.display().to_string())
    } else {
        None
    };

    let passed = outcome
        .results
        .iter()
        .filter(|(_, file)| file.all_passed())
        .count();

    Ok(RunSummary {
        files: paths.len(),
        passed,
        with_failed_checks: outcome.results.len() - passed,
        aborted: outcome.failures.len(),
        results_file: results_file.display().to_string(),
        report_file,
        failures: outcome.failures.iter().map(FailureRow::from).collect(),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}
