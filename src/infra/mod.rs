pub mod notifier;
pub mod object_store;

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::app::alert_use_case::AlertUseCase;
use crate::app::dispatch_use_case::DispatchUseCase;
use crate::app::ports::{NotificationPort, ObjectStorePort};
use crate::config::Config;
use crate::error::{GateError, Result};
use crate::pipeline::validation::FileValidator;

use notifier::{LogNotifier, OutboxNotifier, WebhookNotifier};
use object_store::{FsObjectStore, HttpObjectStore};

const FILE_SCHEME: &str = "file://";

/// Storage adapter for the configured backend; the working directory when none is set.
pub fn object_store_from_config(config: &Config) -> Result<Arc<dyn ObjectStorePort>> {
    let timeout = Duration::from_secs(config.http_timeout_seconds);
    match (&config.storage.base_url, &config.storage.root) {
        (Some(url), _) => {
            let store = HttpObjectStore::new(url, config.storage.token.clone(), timeout)
                .map_err(|e| GateError::Config(e.to_string()))?;
            Ok(Arc::new(store))
        }
        (None, Some(root)) => Ok(Arc::new(FsObjectStore::new(root))),
        (None, None) => Ok(Arc::new(FsObjectStore::new("."))),
    }
}

/// Notification adapter chosen from the shape of the channel address.
pub fn notifier_for_channel(channel: &str, timeout: Duration) -> Result<Arc<dyn NotificationPort>> {
    if channel.starts_with("http://") || channel.starts_with("https://") {
        let notifier = WebhookNotifier::new(timeout).map_err(|e| GateError::Config(e.to_string()))?;
        Ok(Arc::new(notifier))
    } else if let Some(path) = channel.strip_prefix(FILE_SCHEME) {
        Ok(Arc::new(OutboxNotifier::new(path)))
    } else {
        Ok(Arc::new(LogNotifier))
    }
}

/// Wire the dispatcher with the adapters named by the configuration.
pub fn build_dispatcher(config: &Config) -> Result<DispatchUseCase> {
    let store = object_store_from_config(config)?;
    let timeout = Duration::from_secs(config.http_timeout_seconds);
    if !config.alerting_enabled() {
        warn!("No alert channel configured; validation failures will only be logged");
    }
    let notifier = notifier_for_channel(&config.alert_channel, timeout)?;
    let alerts = AlertUseCase::new(notifier, config.alert_channel.clone());
    Ok(DispatchUseCase::new(
        store,
        FileValidator::new(&config.schema),
        alerts,
        config.extension.clone(),
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use std::net::TcpListener;

    /// Serves `router` on an ephemeral loopback port and returns its base URL.
    pub(crate) fn spawn_router(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = hyper::Server::from_tcp(listener).unwrap().serve(router.into_make_service());
        tokio::spawn(server);
        format!("http://{}", addr)
    }
}
