use async_trait::async_trait;

use crate::error::{NotifyError, StorageError};

/// Read side of the object store that receives uploads.
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    async fn fetch(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError>;
}

/// Delivery side of the alert channel. Returns the channel's message id.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn publish(&self, channel: &str, subject: &str, body: &str) -> Result<String, NotifyError>;
}
