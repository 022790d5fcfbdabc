use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::app::ports::NotificationPort;
use crate::error::NotifyError;

#[derive(Debug, Serialize)]
struct AlertMessage<'a> {
    subject: &'a str,
    message: &'a str,
}

/// POSTs `{subject, message}` as JSON to the channel URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl NotificationPort for WebhookNotifier {
    async fn publish(&self, channel: &str, subject: &str, body: &str) -> Result<String, NotifyError> {
        let resp = self
            .client
            .post(channel)
            .json(&AlertMessage { subject, message: body })
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::Status(resp.status().as_u16()));
        }

        // Receivers may answer with {"message_id": ...}; anything else gets a local id
        let message_id = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("message_id").and_then(|id| id.as_str()).map(str::to_string))
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Ok(message_id)
    }
}

#[derive(Debug, Serialize)]
struct OutboxLine<'a> {
    message_id: &'a str,
    published_at: String,
    subject: &'a str,
    message: &'a str,
}

/// Appends one NDJSON line per alert to a local file.
pub struct OutboxNotifier {
    path: PathBuf,
}

impl OutboxNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NotificationPort for OutboxNotifier {
    async fn publish(&self, _channel: &str, subject: &str, body: &str) -> Result<String, NotifyError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let message_id = uuid::Uuid::new_v4().to_string();
        let line = serde_json::to_string(&OutboxLine {
            message_id: &message_id,
            published_at: Utc::now().to_rfc3339(),
            subject,
            message: body,
        })?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        Ok(message_id)
    }
}

/// Writes alerts to the log only.
pub struct LogNotifier;

#[async_trait]
impl NotificationPort for LogNotifier {
    async fn publish(&self, channel: &str, subject: &str, body: &str) -> Result<String, NotifyError> {
        let message_id = uuid::Uuid::new_v4().to_string();
        info!(channel = %channel, subject = %subject, message_id = %message_id, body = %body, "Alert recorded");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_support::spawn_router;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tempfile::tempdir;

    async fn echo_alert(Json(alert): Json<Value>) -> Json<Value> {
        let id = format!(
            "{}|{}",
            alert["subject"].as_str().unwrap_or_default(),
            alert["message"].as_str().unwrap_or_default()
        );
        Json(json!({ "message_id": id }))
    }

    fn webhook_base() -> String {
        let router = Router::new()
            .route("/hooks/echo", post(echo_alert))
            .route("/hooks/plain", post(|| async { "accepted" }))
            .route("/hooks/empty", post(|| async { StatusCode::ACCEPTED }))
            .route("/hooks/broken", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        spawn_router(router)
    }

    fn webhook() -> WebhookNotifier {
        WebhookNotifier::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn webhook_posts_subject_and_message_and_keeps_returned_id() {
        let base = webhook_base();
        let id = webhook()
            .publish(&format!("{base}/hooks/echo"), "CSV Validation Failed: a.csv", "Line Number: 2")
            .await
            .unwrap();
        assert_eq!(id, "CSV Validation Failed: a.csv|Line Number: 2");
    }

    #[tokio::test]
    async fn webhook_without_message_id_gets_generated_one() {
        let base = webhook_base();
        for path in ["/hooks/plain", "/hooks/empty"] {
            let id = webhook().publish(&format!("{base}{path}"), "s", "b").await.unwrap();
            assert!(uuid::Uuid::parse_str(&id).is_ok(), "{path}: {id}");
        }
    }

    #[tokio::test]
    async fn webhook_error_status_is_reported() {
        let base = webhook_base();
        let err = webhook()
            .publish(&format!("{base}/hooks/broken"), "s", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Status(500)), "{err:?}");

        let err = webhook().publish(&format!("{base}/hooks/unknown"), "s", "b").await.unwrap_err();
        assert!(matches!(err, NotifyError::Status(404)), "{err:?}");
    }

    #[tokio::test]
    async fn webhook_unreachable_is_a_transport_error() {
        let err = webhook().publish("http://127.0.0.1:1/hooks", "s", "b").await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)), "{err:?}");
    }

    #[tokio::test]
    async fn outbox_appends_one_line_per_alert() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts/outbox.ndjson");
        let notifier = OutboxNotifier::new(&path);

        let first = notifier.publish("file://x", "subject one", "body\none").await.unwrap();
        notifier.publish("file://x", "subject two", "body two").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["message_id"], first.as_str());
        assert_eq!(lines[0]["subject"], "subject one");
        assert_eq!(lines[0]["message"], "body\none");
        assert_eq!(lines[1]["subject"], "subject two");
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let id = LogNotifier.publish("ops", "s", "b").await.unwrap();
        assert!(!id.is_empty());
    }
}
