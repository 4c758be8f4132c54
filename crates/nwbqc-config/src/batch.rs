//! Batch execution settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Worker threads; 0 uses one per core.
    #[serde(default)]
    pub jobs: usize,

    /// Suffix attached to generated file names (usually the experimenter).
    #[serde(default)]
    pub postfix: String,
}

/// Report generation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Write the plain-text report next to the results file.
    #[serde(default = "default_write_text")]
    pub write_text: bool,
}

const fn default_write_text() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            write_text: default_write_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let batch = BatchConfig::default();
        assert_eq!(batch.jobs, 0);
        assert!(batch.postfix.is_empty());
        assert!(ReportConfig::default().write_text);
    }
}
