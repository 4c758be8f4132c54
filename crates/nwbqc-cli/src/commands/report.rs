use std::path::{Path, PathBuf};

use anyhow::Context;
use nwbqc_config::QcConfig;
use nwbqc_core::QcResults;
use serde::Serialize;

use crate::cli::{GlobalFlags, ReportArgs};
use crate::output::output;
use crate::report;

#[derive(Debug, Serialize)]
struct ReportSummary {
    results_file: String,
    report_file: String,
    files: usize,
    files_with_failed_checks: usize,
}

/// Handle `nwbqc report`.
pub fn handle(args: &ReportArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = QcConfig::load_with_dotenv().context("failed to load nwbqc configuration")?;
    let postfix = args.postfix.clone().unwrap_or(config.batch.postfix);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.paths.output_root());

    let summary = write_report(&args.results, &postfix, &output_dir)?;
    output(&summary, flags.format)
}

fn write_report(
    results_file: &Path,
    postfix: &str,
    output_dir: &Path,
) -> anyhow::Result<ReportSummary> {
    let json = std::fs::read_to_string(results_file)
        .with_context(|| format!("failed to read {}", results_file.display()))?;
    let results = QcResults::from_json(&json)
        .with_context(|| format!("{} is not a valid results file", results_file.display()))?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let report_file: PathBuf = report::report_path(output_dir, postfix);
    let text = report::render(&results, &[], postfix, chrono::Local::now());
    std::fs::write(&report_file, text)
        .with_context(|| format!("failed to write {}", report_file.display()))?;
    tracing::info!(report = %report_file.display(), files = results.len(), "report written");

    Ok(ReportSummary {
        results_file: results_file.display().to_string(),
        report_file: report_file.display().to_string(),
        files: results.len(),
        files_with_failed_checks: results.iter().filter(|(_, file)| !file.all_passed()).count(),
    })
}
