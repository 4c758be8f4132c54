pub mod report;
pub mod schema;
pub mod validate;
