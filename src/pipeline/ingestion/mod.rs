pub mod event;

pub use event::{decode_key, file_reference, EventBatch};
