//! Plain-text QC report and the names of generated files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use nwbqc_core::QcResults;
use nwbqc_validate::FileError;

pub const SUCCESS_LINE: &str = "Report is created successfully.";

const TITLE: &str = "NWB Conversion Quality Control Report";

/// `qc_results_<postfix>.json`, or `qc_results.json` without a postfix.
#[must_use]
pub fn results_file_name(postfix: &str) -> String {
    if postfix.is_empty() {
        "qc_results.json".to_string()
    } else {
        format!("qc_results_{postfix}.json")
    }
}

/// `<postfix>_report.txt`, or `report.txt` without a postfix.
#[must_use]
pub fn report_file_name(postfix: &str) -> String {
    if postfix.is_empty() {
        "report.txt".to_string()
    } else {
        format!("{postfix}_report.txt")
    }
}

#[must_use]
pub fn report_path(output_dir: &Path, postfix: &str) -> PathBuf {
    output_dir.join(report_file_name(postfix))
}

/// Render the report of a batch.
///
/// Files are listed in identifier order, followed by the files whose
/// validation was aborted.
#[must_use]
pub fn render(
    results: &QcResults,
    aborted: &[FileError],
    experimenter: &str,
    generated: DateTime<Local>,
) -> String {
    let experimenter = if experimenter.is_empty() {
        "unknown"
    } else {
        experimenter
    };

    let mut lines = vec![
        TITLE.to_string(),
        "=".repeat(TITLE.len()),
        format!("Experimenter: {experimenter}"),
        format!("Generated: {}", generated.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];

    let mut clean = 0usize;
    for (file_id, file) in results.iter() {
        let failed = file.failed_check_paths();
        let total = file.check_count();
        if failed.is_empty() {
            clean += 1;
        }

        lines.push(format!("File: {file_id}"));
        lines.push(format!(
            "  Datasets: {}, checks passed: {}, failed: {}",
            file.datasets.dataset_count(),
            total.saturating_sub(failed.len()),
            failed.len()
        ));
        lines.extend(failed.iter().map(|path| format!("  {path}")));
        lines.push(String::new());
    }

    for error in aborted {
        lines.push(format!("File: {}", error.path.display()));
        if let Some(file_id) = &error.file_id {
            lines.push(format!("  Identifier: {file_id}"));
        }
        lines.push(format!("  Aborted during {}: {}", error.stage, error.source));
        lines.push(String::new());
    }

    lines.push(format!(
        "Summary: {} file(s) validated, {clean} passed every check, \
         {} with failed checks, {} aborted.",
        results.len(),
        results.len() - clean,
        aborted.len()
    ));
    lines.push(SUCCESS_LINE.to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::{Local, TimeZone};
    use nwbqc_core::QcResults;
    use nwbqc_validate::{FileError, Stage, ValidateError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn results() -> QcResults {
        let check_group = |names: &[&str], failing: Option<&str>| {
            names
                .iter()
                .map(|name| ((*name).to_string(), json!(Some(*name) != failing)))
                .collect::<serde_json::Map<_, _>>()
        };
        let metadata = check_group(
            &[
                "experiment_description",
                "experimenter",
                "file_create_date",
                "identifier",
                "institution",
                "lab",
                "session_description",
                "session_start_time",
                "slices",
                "timestamps_reference_time",
            ],
            None,
        );
        let dataset = |failing: Option<&str>| {
            json!({
                "data": check_group(&["data_equal"], None),
                "metadata_validation": check_group(
                    &["sampling_rates_close", "igor_header_correct", "wavenotes_equal"],
                    failing,
                ),
                "metadata_verification": check_group(
                    &[
                        "wavenotes_present",
                        "description_present",
                        "sampling_rate_present",
                        "gain_present",
                    ],
                    None,
                ),
                "additional_tests": check_group(&["igor_file_present"], None),
            })
        };
        let tree = json!({
            "file-a": {
                "metadata": metadata,
                "datasets": {"acquisition": {"s1": dataset(None)}, "stimulus": {}},
            },
            "file-b": {
                "metadata": metadata,
                "datasets": {
                    "acquisition": {"s1": dataset(Some("sampling_rates_close"))},
                    "stimulus": {},
                },
            },
        });
        QcResults::from_json(&tree.to_string()).expect("fixture tree should be valid")
    }

    #[test]
    fn file_names_follow_postfix() {
        assert_eq!(results_file_name("BJM"), "qc_results_BJM.json");
        assert_eq!(report_file_name("BJM"), "BJM_report.txt");
        assert_eq!(results_file_name(""), "qc_results.json");
        assert_eq!(
            report_path(Path::new("out"), "BJM"),
            PathBuf::from("out/BJM_report.txt")
        );
    }

    #[test]
    fn report_lists_failed_paths_and_ends_with_success_line() {
        let generated = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let aborted = vec![FileError {
            path: PathBuf::from("nwb/broken.nwb"),
            file_id: None,
            stage: Stage::Connect,
            source: ValidateError::MissingIdentifier {
                path: PathBuf::from("nwb/broken.nwb"),
            },
        }];

        let report = render(&results(), &aborted, "BJM", generated);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], TITLE);
        assert_eq!(lines[2], "Experimenter: BJM");
        assert_eq!(lines[3], "Generated: 2024-03-01 09:30:00");
        assert!(report.contains("File: file-a\n  Datasets: 1, checks passed: 19, failed: 0\n"));
        assert!(report.contains(
            "  datasets/acquisition/s1/metadata_validation/sampling_rates_close failed.\n"
        ));
        assert!(report.contains("File: nwb/broken.nwb\n  Aborted during connect: "));
        assert_eq!(
            lines[lines.len() - 2],
            "Summary: 2 file(s) validated, 1 passed every check, 1 with failed checks, 1 aborted."
        );
        assert_eq!(lines[lines.len() - 1], SUCCESS_LINE);
    }

    #[test]
    fn empty_batch_still_produces_a_report() {
        let generated = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let report = render(&QcResults::new(), &[], "", generated);
        assert!(report.contains("Experimenter: unknown"));
        assert!(report.ends_with("Report is created successfully.\n"));
    }

    #[test]
    fn empty_batch_report_layout() {
        let generated = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let report = render(&QcResults::new(), &[], "BJM", generated);
        assert_eq!(
            report,
            "NWB Conversion Quality Control Report\n\
             =====================================\n\
             Experimenter: BJM\n\
             Generated: 2024-03-01 09:30:00\n\
             \n\
             Summary: 0 file(s) validated, 0 passed every check, 0 with failed checks, 0 aborted.\n\
             Report is created successfully.\n"
        );
    }
}
