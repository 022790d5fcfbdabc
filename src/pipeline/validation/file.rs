use chrono::{Local, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::app::ports::ObjectStorePort;
use crate::config::SchemaConfig;
use crate::constants::{FILE_LEVEL_LINE, FIRST_DATA_LINE, HEADER_LINE};
use crate::domain::{FileReference, Record};
use crate::pipeline::validation::row::RowValidator;
use crate::pipeline::validation::{FailureKind, ValidationOutcome};

const UTF8_BOM: char = '\u{feff}';

/// Header names that must all appear in the header row, in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredSchema {
    columns: Vec<String>,
}

impl RequiredSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Required names absent from `present`, sorted.
    pub fn missing<'a, I>(&self, present: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: BTreeSet<&str> = present.into_iter().collect();
        let missing: BTreeSet<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| !present.contains(c))
            .collect();
        missing.into_iter().map(str::to_string).collect()
    }
}

impl From<&SchemaConfig> for RequiredSchema {
    fn from(schema: &SchemaConfig) -> Self {
        Self::new([
            schema.identifier.clone(),
            schema.contact_address.clone(),
            schema.enrollment_date.clone(),
        ])
    }
}

impl Default for RequiredSchema {
    fn default() -> Self {
        Self::from(&SchemaConfig::default())
    }
}

/// Parses a CSV blob and walks its rows, stopping at the first defect.
#[derive(Debug, Clone)]
pub struct FileValidator {
    schema: RequiredSchema,
    rows: RowValidator,
}

impl FileValidator {
    pub fn new(schema: &SchemaConfig) -> Self {
        Self {
            schema: RequiredSchema::from(schema),
            rows: RowValidator::new(schema.clone()),
        }
    }

    /// Fetch the object and validate it. Storage failures become a line-0 outcome.
    pub async fn validate_file(&self, store: &dyn ObjectStorePort, file: &FileReference) -> ValidationOutcome {
        match store.fetch(&file.container, &file.key).await {
            Ok(bytes) => {
                debug!(file = %file, bytes = bytes.len(), "Fetched object");
                self.validate_content(&bytes)
            }
            Err(e) => ValidationOutcome::invalid(FILE_LEVEL_LINE, FailureKind::Unreadable(e.to_string())),
        }
    }

    /// Validate a local file. Read failures become a line-0 outcome.
    pub fn validate_path(&self, path: &Path) -> ValidationOutcome {
        match std::fs::read(path) {
            Ok(bytes) => self.validate_content(&bytes),
            Err(e) => ValidationOutcome::invalid(
                FILE_LEVEL_LINE,
                FailureKind::Unreadable(format!("{}: {}", path.display(), e)),
            ),
        }
    }

    pub fn validate_content(&self, bytes: &[u8]) -> ValidationOutcome {
        self.validate_content_on(bytes, Local::now().date_naive())
    }

    pub fn validate_content_on(&self, bytes: &[u8], today: NaiveDate) -> ValidationOutcome {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.strip_prefix(UTF8_BOM).unwrap_or(text),
            Err(e) => return ValidationOutcome::invalid(FILE_LEVEL_LINE, FailureKind::Unreadable(e.to_string())),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: StringRecord = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(e) => return ValidationOutcome::invalid(FILE_LEVEL_LINE, FailureKind::Unreadable(e.to_string())),
        };
        // A row of blank names still counts as a header; its names are just missing
        if headers.is_empty() {
            return ValidationOutcome::invalid(HEADER_LINE, FailureKind::EmptyHeader);
        }

        let missing = self.schema.missing(headers.iter());
        if !missing.is_empty() {
            return ValidationOutcome::invalid(HEADER_LINE, FailureKind::MissingHeaders(missing));
        }

        // Numbered per record, so quoted cells spanning lines count once
        for (index, result) in reader.records().enumerate() {
            let line_number = FIRST_DATA_LINE + index;
            let cells = match result {
                Ok(cells) => cells,
                Err(e) => return ValidationOutcome::invalid(FILE_LEVEL_LINE, FailureKind::Unreadable(e.to_string())),
            };
            let record = Record::from_cells(headers.iter(), cells.iter());
            if let Err(violation) = self.rows.validate_row_on(&record, today) {
                return ValidationOutcome::invalid(line_number, FailureKind::Row(violation));
            }
        }

        ValidationOutcome::Valid
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(&SchemaConfig::default())
    }
}
