use clap::Parser;

pub mod commands;
pub mod global;

pub use commands::{Commands, ReportArgs, ValidateArgs};
pub use global::{GlobalFlags, OutputFormat, ProgressMode};

/// Top-level CLI parser for the `nwbqc` binary.
#[derive(Debug, Parser)]
#[command(
    name = "nwbqc",
    version,
    about = "Quality control of NWB conversions against the original Igor archives"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Summary output format: json, table, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no progress)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Progress bar: auto, on, off
    #[arg(long, global = true, default_value = "auto")]
    pub progress: ProgressMode,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            progress: self.progress,
        }
    }
}
