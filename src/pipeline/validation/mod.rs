pub mod file;
pub mod row;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

pub use file::{FileValidator, RequiredSchema};
pub use row::RowValidator;

/// Field-level failure of a single data row, checked in declaration order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowViolation {
    #[error("identifier is empty")]
    IdentifierEmpty,

    #[error("identifier must be alphanumeric")]
    IdentifierNotAlphanumeric,

    #[error("email is empty")]
    ContactAddressEmpty,

    #[error("email format is invalid")]
    ContactAddressInvalid,

    #[error("signup_date is empty")]
    DateEmpty,

    #[error("signup_date must be in YYYY-MM-DD format")]
    DateMalformed,

    #[error("signup_date cannot be in the future")]
    DateInFuture,
}

/// Why a file was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Fetch, decode or CSV read failure
    #[error("Error processing file: {0}")]
    Unreadable(String),

    #[error("CSV file is empty or has no headers")]
    EmptyHeader,

    /// Names are kept sorted
    #[error("Missing required headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error(transparent)]
    Row(RowViolation),
}

/// First defect found in a file. Line 0 is file-level, 1 the header, 2+ a data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub line_number: usize,
    pub kind: FailureKind,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Verdict for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn invalid(line_number: usize, kind: FailureKind) -> Self {
        ValidationOutcome::Invalid(ValidationFailure { line_number, kind })
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn error(&self) -> Option<String> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(failure) => Some(failure.to_string()),
        }
    }

    pub fn line_number(&self) -> Option<usize> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(failure) => Some(failure.line_number),
        }
    }
}

// Flat `{is_valid, error?, line_number?}` shape for reports and the CLI
impl Serialize for ValidationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ValidationOutcome::Valid => {
                let mut s = serializer.serialize_struct("ValidationOutcome", 1)?;
                s.serialize_field("is_valid", &true)?;
                s.end()
            }
            ValidationOutcome::Invalid(failure) => {
                let mut s = serializer.serialize_struct("ValidationOutcome", 3)?;
                s.serialize_field("is_valid", &false)?;
                s.serialize_field("error", &failure.to_string())?;
                s.serialize_field("line_number", &failure.line_number)?;
                s.end()
            }
        }
    }
}
