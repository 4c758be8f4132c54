use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Validate every NWB file in a directory against its Igor archive.
    Validate(ValidateArgs),
    /// Write the text report of a saved results file.
    Report(ReportArgs),
    /// Print the JSON Schema of the results file.
    Schema,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Directory containing the converted `.nwb` files.
    #[arg(short = 'n', long)]
    pub nwb_dir: Option<PathBuf>,

    /// Directory containing the original Igor `.tar`/`.tgz` archives.
    #[arg(short = 'i', long)]
    pub igor_dir: Option<PathBuf>,

    /// Headerless CSV mapping NWB file stems to archive names.
    #[arg(short = 'm', long)]
    pub mapfile: Option<PathBuf>,

    /// Suffix of the generated file names (usually the experimenter).
    #[arg(short = 'p', long)]
    pub postfix: Option<String>,

    /// Worker threads (0 = one per core).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Where the results file and report are written.
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Skip the text report.
    #[arg(long)]
    pub no_report: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ReportArgs {
    /// Saved results file (`qc_results_<postfix>.json`).
    #[arg(short, long)]
    pub results: PathBuf,

    /// Suffix of the report file name.
    #[arg(short = 'p', long)]
    pub postfix: Option<String>,

    /// Where the report is written.
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,
}
