//! Input, scratch and output locations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default scratch root for archive extraction.
fn default_scratch_dir() -> String {
    ".temp-igor".to_string()
}

/// Default output directory for results and reports.
fn default_output_dir() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory containing the converted `.nwb` files.
    #[serde(default)]
    pub nwb_dir: String,

    /// Directory containing the original Igor archives.
    #[serde(default)]
    pub igor_dir: String,

    /// Two-column CSV mapping NWB file stems to archive names.
    /// Empty means archive names are derived from dataset descriptions.
    #[serde(default)]
    pub mapfile: String,

    /// Root under which each file gets its own extraction directory.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,

    /// Where results files and reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            nwb_dir: String::new(),
            igor_dir: String::new(),
            mapfile: String::new(),
            scratch_dir: default_scratch_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl PathsConfig {
    /// Mapping file path, if one is configured.
    #[must_use]
    pub fn mapfile(&self) -> Option<PathBuf> {
        (!self.mapfile.is_empty()).then(|| PathBuf::from(&self.mapfile))
    }

    #[must_use]
    pub fn scratch_root(&self) -> PathBuf {
        PathBuf::from(&self.scratch_dir)
    }

    #[must_use]
    pub fn output_root(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = PathsConfig::default();
        assert_eq!(config.scratch_dir, ".temp-igor");
        assert_eq!(config.output_dir, ".");
        assert!(config.mapfile().is_none());
        assert!(config.nwb_dir.is_empty());
    }
}
