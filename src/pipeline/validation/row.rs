use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SchemaConfig;
use crate::constants::DATE_FORMAT;
use crate::domain::Record;
use crate::pipeline::validation::RowViolation;

static CONTACT_ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("contact address pattern")
});

// chrono alone accepts unpadded month/day, so the shape is pinned first
static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date shape pattern"));

/// Field rules for one data row. Checks run identifier, contact address, then date;
/// the first failure wins.
#[derive(Debug, Clone)]
pub struct RowValidator {
    columns: SchemaConfig,
}

impl RowValidator {
    pub fn new(columns: SchemaConfig) -> Self {
        Self { columns }
    }

    /// Validate against today's local calendar date.
    pub fn validate_row(&self, record: &Record) -> Result<(), RowViolation> {
        self.validate_row_on(record, Local::now().date_naive())
    }

    pub fn validate_row_on(&self, record: &Record, today: NaiveDate) -> Result<(), RowViolation> {
        check_identifier(record.get(&self.columns.identifier))?;
        check_contact_address(record.get(&self.columns.contact_address))?;
        check_date(record.get(&self.columns.enrollment_date), today)?;
        Ok(())
    }
}

impl Default for RowValidator {
    fn default() -> Self {
        Self::new(SchemaConfig::default())
    }
}

pub fn check_identifier(raw: &str) -> Result<(), RowViolation> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RowViolation::IdentifierEmpty);
    }
    if !value.chars().all(char::is_alphanumeric) {
        return Err(RowViolation::IdentifierNotAlphanumeric);
    }
    Ok(())
}

pub fn check_contact_address(raw: &str) -> Result<(), RowViolation> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RowViolation::ContactAddressEmpty);
    }
    if !CONTACT_ADDRESS_PATTERN.is_match(value) {
        return Err(RowViolation::ContactAddressInvalid);
    }
    Ok(())
}

pub fn check_date(raw: &str, today: NaiveDate) -> Result<(), RowViolation> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RowViolation::DateEmpty);
    }
    if !DATE_SHAPE.is_match(value) {
        return Err(RowViolation::DateMalformed);
    }
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| RowViolation::DateMalformed)?;
    // Same day is allowed
    if date > today {
        return Err(RowViolation::DateInFuture);
    }
    Ok(())
}
