//! IBW parsing error types.

use std::path::PathBuf;

/// Errors raised while reading an Igor binary wave file.
#[derive(Debug, thiserror::Error)]
pub enum IgorError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A field lies beyond the end of the buffer.
    #[error("IBW field {field} out of bounds: start={start}, end={end}, len={len}")]
    Truncated {
        field: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },

    /// The version word matches no supported format in either byte order.
    #[error("unsupported IBW version word {0:#06x}")]
    UnsupportedVersion(u16),

    /// Text, complex, or unknown element type.
    #[error("unsupported IBW wave type {0:#06x}")]
    UnsupportedType(i16),

    /// Header values are inconsistent with each other or with the file size.
    #[error("corrupt IBW header: {0}")]
    Corrupt(String),
}
