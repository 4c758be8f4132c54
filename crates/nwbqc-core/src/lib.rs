//! # nwbqc-core
//!
//! Core types shared by every nwbqc crate:
//! - Closed check-name enums, one per result category
//! - The nested pass/fail result tree and its JSON persistence
//! - Schema and core error types
//! - Flattening of a result tree into failed-check paths
//! - Best-effort decoding of annotation bytes

pub mod checks;
pub mod errors;
pub mod flatten;
pub mod results;
pub mod text;

pub use checks::{
    AdditionalTest, Category, CheckName, DataCheck, MetadataValidation, MetadataVerification,
    RequiredField,
};
pub use errors::{CoreError, SchemaError};
pub use flatten::failed_check_paths;
pub use results::{Checks, DatasetResult, DatasetResults, FileResult, QcResults};
pub use text::RawString;
