//! Value objects passed between the dispatcher, the validators and the alerting side.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::pipeline::validation::ValidationFailure;

/// Location of one uploaded object. The key is already URL-decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileReference {
    pub container: String,
    pub key: String,
}

impl FileReference {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    /// Case-insensitive suffix match against the recognized extension.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.key
            .to_lowercase()
            .ends_with(&extension.to_lowercase())
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// One data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    cells: HashMap<String, String>,
}

impl Record {
    /// Zip header names with cell values. Cells past the header count are dropped.
    pub fn from_cells<'a, H, C>(headers: H, cells: C) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        C: IntoIterator<Item = &'a str>,
    {
        let cells = headers
            .into_iter()
            .zip(cells)
            .map(|(h, c)| (h.to_string(), c.to_string()))
            .collect();
        Self { cells }
    }

    /// Raw cell value, empty when the column is absent from this row.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Alert content for one failed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    #[serde(rename = "bucket")]
    pub container: String,
    #[serde(rename = "file_name")]
    pub key: String,
    pub line_number: Option<usize>,
    pub error_description: String,
}

impl AlertPayload {
    pub fn from_failure(file: &FileReference, failure: &ValidationFailure) -> Self {
        Self {
            container: file.container.clone(),
            key: file.key.clone(),
            line_number: Some(failure.line_number),
            error_description: failure.to_string(),
        }
    }

    pub fn subject(&self) -> String {
        format!("{}: {}", crate::constants::ALERT_SUBJECT_PREFIX, self.key)
    }

    pub fn body(&self) -> String {
        let line = self
            .line_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "CSV File Validation Failed\n\n\
             Bucket: {}\n\
             File: {}\n\
             Line Number: {}\n\
             Error: {}\n\n\
             Please check the file and re-upload a corrected version.",
            self.container, self.key, line, self.error_description
        )
    }
}
