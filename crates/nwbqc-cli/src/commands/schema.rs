use nwbqc_core::QcResults;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

/// Handle `nwbqc schema`.
///
/// The schema is always JSON; `--format raw` prints it on one line.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schemars::schema_for!(QcResults);
    let format = match flags.format {
        OutputFormat::Raw => OutputFormat::Raw,
        OutputFormat::Json | OutputFormat::Table => OutputFormat::Json,
    };
    output(&schema, format)
}
