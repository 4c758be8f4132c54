//! Schema and core error types.
//!
//! Validation-stage errors (archives, containers, original files) live in
//! `nwbqc-validate`. The errors here are about the result tree itself.

use thiserror::Error;

/// A check name that is not part of the fixed schema of its group.
///
/// Metadata checks and additional tests are reported as distinct variants so
/// the caller can tell which schema went out of sync.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Name is not part of `metadata_validation` or `metadata_verification`.
    #[error("'{name}' is not part of the {group} schema (unregistered metadata check)")]
    UnregisteredMetadata { group: &'static str, name: String },

    /// Name is not part of `additional_tests`.
    #[error("'{0}' is not part of the additional tests (unregistered additional test)")]
    UnregisteredTest(String),

    /// Name is not part of the `data` checks.
    #[error("'{0}' is not part of the data checks (unregistered data check)")]
    UnregisteredDataCheck(String),

    /// Name is not one of the required file-level metadata fields.
    #[error("'{0}' is not a required file metadata field")]
    UnregisteredField(String),

    /// The tree does not have the expected nesting.
    #[error("malformed results tree at '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

/// Errors raised while assembling, saving or loading a results tree.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Two converted files reported the same identifier.
    #[error("duplicate file identifier '{0}' in results")]
    DuplicateIdentifier(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
