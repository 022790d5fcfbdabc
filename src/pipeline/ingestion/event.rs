use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::FileReference;
use crate::error::{DispatchError, GateError, Result};

/// One delivery from the event source. Entries stay raw so a malformed entry
/// only fails itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBatch {
    #[serde(rename = "Records")]
    pub records: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ObjectCreatedRecord {
    s3: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    bucket: BucketEntity,
    object: ObjectKeyEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectKeyEntity {
    key: String,
}

impl EventBatch {
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| GateError::Batch(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Container and decoded key of one notification entry.
pub fn file_reference(entry: &Value) -> std::result::Result<FileReference, DispatchError> {
    let record: ObjectCreatedRecord =
        serde_json::from_value(entry.clone()).map_err(|e| DispatchError::MalformedEntry(e.to_string()))?;
    Ok(FileReference::new(record.s3.bucket.name, decode_key(&record.s3.object.key)))
}

/// Form-URL decoding: `+` is a space, `%XX` an escaped byte.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
