pub mod ingestion;
pub mod validation;
