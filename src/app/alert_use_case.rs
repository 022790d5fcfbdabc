use std::sync::Arc;
use tracing::{error, info, warn};

use crate::app::ports::NotificationPort;
use crate::domain::{AlertPayload, FileReference};
use crate::observability::metrics;
use crate::pipeline::validation::ValidationFailure;

/// What happened to one alert. Informational only; delivery problems never propagate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDelivery {
    Sent { message_id: String },
    /// No channel configured
    Skipped,
    Failed { reason: String },
}

/// Turns a failed validation into a notification on the configured channel.
pub struct AlertUseCase {
    notifier: Arc<dyn NotificationPort>,
    channel: String,
}

impl AlertUseCase {
    pub fn new(notifier: Arc<dyn NotificationPort>, channel: impl Into<String>) -> Self {
        Self {
            notifier,
            channel: channel.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.channel.is_empty()
    }

    pub async fn notify(&self, file: &FileReference, failure: &ValidationFailure) -> AlertDelivery {
        if !self.is_configured() {
            warn!(file = %file, "Alert channel not configured, skipping notification");
            return AlertDelivery::Skipped;
        }

        let payload = AlertPayload::from_failure(file, failure);
        let subject = payload.subject();
        let body = payload.body();
        info!(
            file = %file,
            line_number = failure.line_number,
            channel = %self.channel,
            "Sending validation alert"
        );

        match self.notifier.publish(&self.channel, &subject, &body).await {
            Ok(message_id) => {
                info!(file = %file, message_id = %message_id, "Alert sent");
                metrics::alerts::sent();
                AlertDelivery::Sent { message_id }
            }
            Err(e) => {
                error!(file = %file, error = %e, "Failed to send alert");
                metrics::alerts::failed();
                AlertDelivery::Failed { reason: e.to_string() }
            }
        }
    }
}
