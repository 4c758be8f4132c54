//! Best-effort text decoding for annotations stored as raw bytes.

use std::fmt;

/// A string value that may still be undecoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawString {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawString {
    /// Decode bytes as UTF-8.
    ///
    /// Text and bytes that are not valid UTF-8 are returned unchanged.
    #[must_use]
    pub fn decode(self) -> Self {
        match self {
            Self::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Self::Text(text),
                Err(err) => Self::Bytes(err.into_bytes()),
            },
            text @ Self::Text(_) => text,
        }
    }

    /// The decoded text, or an empty string when the bytes cannot be decoded.
    #[must_use]
    pub fn into_text_or_empty(self) -> String {
        match self.decode() {
            Self::Text(text) => text,
            Self::Bytes(bytes) => {
                tracing::debug!(len = bytes.len(), "annotation is not valid UTF-8; treating as empty");
                String::new()
            }
        }
    }
}

impl From<String> for RawString {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RawString {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RawString {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl fmt::Display for RawString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bytes(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}
