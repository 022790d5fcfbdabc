use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, Instrument};

use crate::app::alert_use_case::{AlertDelivery, AlertUseCase};
use crate::app::ports::ObjectStorePort;
use crate::constants::{ACK_BODY, ACK_STATUS_CODE};
use crate::error::DispatchError;
use crate::observability::metrics;
use crate::pipeline::ingestion::event::{file_reference, EventBatch};
use crate::pipeline::validation::{FileValidator, ValidationOutcome};

/// Fixed reply to the event source once the batch has been iterated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAck {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Default for BatchAck {
    fn default() -> Self {
        Self {
            status_code: ACK_STATUS_CODE,
            body: ACK_BODY.to_string(),
        }
    }
}

/// How one batch entry ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryResult {
    Skipped,
    Passed,
    Failed { alert: AlertDelivery },
}

/// Per-batch tallies, logged when the batch is done.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub total_entries: usize,
    pub skipped: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl BatchStats {
    fn record(&mut self, result: &Result<EntryResult, DispatchError>) {
        self.total_entries += 1;
        match result {
            Ok(EntryResult::Skipped) => self.skipped += 1,
            Ok(EntryResult::Passed) => self.passed += 1,
            Ok(EntryResult::Failed { .. }) => self.failed += 1,
            Err(_) => self.errored += 1,
        }
    }
}

/// Routes file-arrival entries through validation and alerting, one at a time.
pub struct DispatchUseCase {
    store: Arc<dyn ObjectStorePort>,
    validator: FileValidator,
    alerts: AlertUseCase,
    extension: String,
}

impl DispatchUseCase {
    pub fn new(
        store: Arc<dyn ObjectStorePort>,
        validator: FileValidator,
        alerts: AlertUseCase,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            store,
            validator,
            alerts,
            extension: extension.into(),
        }
    }

    /// Process every entry. Always acknowledges; failures travel through alerts.
    pub async fn handle(&self, batch: &EventBatch) -> BatchAck {
        let stats = self.handle_with_stats(batch).await;
        info!(
            total = stats.total_entries,
            passed = stats.passed,
            failed = stats.failed,
            skipped = stats.skipped,
            errored = stats.errored,
            "Batch processed"
        );
        BatchAck::default()
    }

    pub async fn handle_with_stats(&self, batch: &EventBatch) -> BatchStats {
        let invocation_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("batch", invocation = %invocation_id, entries = batch.len());

        async {
            let mut stats = BatchStats::default();
            for entry in &batch.records {
                let result = self.process_entry(entry).await;
                if let Err(e) = &result {
                    error!(error = %e, "Error processing record");
                    metrics::dispatch::entry_errored();
                }
                stats.record(&result);
            }
            stats
        }
        .instrument(span)
        .await
    }

    pub async fn process_entry(&self, entry: &Value) -> Result<EntryResult, DispatchError> {
        let file = file_reference(entry)?;
        info!(file = %file, "Processing file");

        if !file.has_extension(&self.extension) {
            info!(key = %file.key, extension = %self.extension, "Skipping file with unrecognized extension");
            metrics::dispatch::file_skipped();
            return Ok(EntryResult::Skipped);
        }

        match self.validator.validate_file(self.store.as_ref(), &file).await {
            ValidationOutcome::Valid => {
                info!(key = %file.key, "File validation PASSED");
                metrics::dispatch::file_passed();
                Ok(EntryResult::Passed)
            }
            ValidationOutcome::Invalid(failure) => {
                error!(
                    key = %file.key,
                    line_number = failure.line_number,
                    error = %failure,
                    "File validation FAILED"
                );
                metrics::dispatch::file_failed();
                let alert = self.alerts.notify(&file, &failure).await;
                Ok(EntryResult::Failed { alert })
            }
        }
    }
}
