//! Counters for the validation pipeline.
//!
//! Recording goes through the `metrics` facade, so calls are no-ops until a
//! recorder is installed with [`init`] (the `serve` command does this and
//! exposes the Prometheus text format on `/metrics`).

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::fmt;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// All metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    FilesPassed,
    FilesFailed,
    FilesSkipped,
    EntriesErrored,
    AlertsSent,
    AlertsFailed,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FilesPassed => "csv_gate_files_passed_total",
            MetricName::FilesFailed => "csv_gate_files_failed_total",
            MetricName::FilesSkipped => "csv_gate_files_skipped_total",
            MetricName::EntriesErrored => "csv_gate_entries_errored_total",
            MetricName::AlertsSent => "csv_gate_alerts_sent_total",
            MetricName::AlertsFailed => "csv_gate_alerts_failed_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [FilesPassed, FilesFailed, FilesSkipped, EntriesErrored, AlertsSent, AlertsFailed].into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    for name in MetricName::all_metrics() {
        ::metrics::describe_counter!(name.as_str(), name.to_string());
    }
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Current metrics in Prometheus text format, empty if no recorder is installed.
pub fn render() -> String {
    METRICS_HANDLE.get().map(|h| h.render()).unwrap_or_default()
}

fn increment(name: MetricName) {
    ::metrics::counter!(name.as_str()).increment(1);
}

pub mod dispatch {
    use super::{increment, MetricName};

    pub fn file_passed() {
        increment(MetricName::FilesPassed);
    }

    pub fn file_failed() {
        increment(MetricName::FilesFailed);
    }

    pub fn file_skipped() {
        increment(MetricName::FilesSkipped);
    }

    pub fn entry_errored() {
        increment(MetricName::EntriesErrored);
    }
}

pub mod alerts {
    use super::{increment, MetricName};

    pub fn sent() {
        increment(MetricName::AlertsSent);
    }

    pub fn failed() {
        increment(MetricName::AlertsFailed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn metric_names_are_unique_and_prefixed() {
        let names: HashSet<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), 6);
        assert!(names.iter().all(|n| n.starts_with("csv_gate_") && n.ends_with("_total")));
    }

    #[test]
    fn recording_without_recorder_is_harmless() {
        dispatch::file_passed();
        alerts::failed();
    }
}
