//! Subscriber setup: env-filtered console output plus optional Discord
//! alerts for ERROR events.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Upper bound on waiting for queued alerts at shutdown.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);
const ALERT_TIMEOUT: Duration = Duration::from_secs(5);

/// Installs the global subscriber. `RUST_LOG` wins over `log_level`.
///
/// The returned [`PendingAlerts`] must be flushed before the runtime shuts
/// down, or alerts for errors logged near exit are lost.
///
/// # Errors
///
/// Returns an error if `log_level` is not a valid filter directive.
pub(crate) fn init(log_level: &str, webhook_url: Option<&str>) -> anyhow::Result<PendingAlerts> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    let pending = PendingAlerts::default();
    let alerts = webhook_url.map(|url| WebhookAlertLayer::new(url.to_string(), pending.clone()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(alerts)
        .init();

    if webhook_url.is_none() {
        tracing::warn!("no Discord webhook URL configured, notifications disabled");
    }
    Ok(pending)
}

/// Alert deliveries still in flight.
#[derive(Clone, Default)]
pub(crate) struct PendingAlerts(Arc<Mutex<Vec<JoinHandle<()>>>>);

impl PendingAlerts {
    fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut handles) = self.0.lock() {
            handles.retain(|h| !h.is_finished());
            handles.push(handle);
        }
    }

    /// Waits for every queued delivery, up to [`FLUSH_TIMEOUT`].
    pub(crate) async fn flush(&self) {
        let handles = self
            .0
            .lock()
            .map(|mut handles| std::mem::take(&mut *handles))
            .unwrap_or_default();
        if handles.is_empty() {
            return;
        }
        let waiting = handles.len();
        let drained = tokio::time::timeout(FLUSH_TIMEOUT, async {
            for handle in handles {
                let _ = handle.await;
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!(waiting, "gave up waiting for error notifications");
        }
    }
}

/// Forwards ERROR events to a Discord webhook.
///
/// Delivery is spawned on the current tokio runtime and tracked in
/// [`PendingAlerts`]. Events emitted outside a runtime are dropped; a failed
/// delivery is logged at WARN.
pub(crate) struct WebhookAlertLayer {
    url: String,
    client: reqwest::Client,
    pending: PendingAlerts,
}

impl WebhookAlertLayer {
    pub(crate) fn new(url: String, pending: PendingAlerts) -> Self {
        let client = reqwest::Client::builder()
            .timeout(ALERT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            url,
            client,
            pending,
        }
    }
}

impl<S: Subscriber> Layer<S> for WebhookAlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let mut visitor = AlertVisitor::default();
        event.record(&mut visitor);
        let payload = serde_json::json!({
            "content": alert_content(event.metadata().target(), &visitor.render()),
        });

        let request = self.client.post(&self.url).json(&payload);
        let delivery = handle.spawn(async move {
            if let Err(e) = request.send().await.and_then(reqwest::Response::error_for_status) {
                tracing::warn!(error = %e, "failed to send error notification");
            }
        });
        self.pending.track(delivery);
    }
}

fn alert_content(target: &str, entry: &str) -> String {
    format!("⚠️ **ETL Pipeline Error**\n```\nERROR {target} - {entry}\n```")
}

/// Collects the message and structured fields of one event.
#[derive(Default)]
struct AlertVisitor {
    message: String,
    fields: String,
}

impl AlertVisitor {
    fn render(&self) -> String {
        if self.fields.is_empty() {
            self.message.clone()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for AlertVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn alert_content_wraps_entry_in_code_block() {
        let content = alert_content("webetl", "failed to fetch site=abby");
        assert_eq!(
            content,
            "⚠️ **ETL Pipeline Error**\n```\nERROR webetl - failed to fetch site=abby\n```"
        );
    }

    #[tokio::test]
    async fn error_events_are_posted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let pending = PendingAlerts::default();
        let layer = WebhookAlertLayer::new(format!("{}/hook", server.uri()), pending.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("not forwarded");
            tracing::error!(site = "abby", "failed to fetch menu page");
        });

        pending.flush().await;
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let content = body["content"].as_str().unwrap();
        assert!(content.starts_with("⚠️ **ETL Pipeline Error**"));
        assert!(content.contains("failed to fetch menu page site=abby"), "{content}");
    }

    #[tokio::test]
    async fn flush_waits_for_slow_deliveries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(300)))
            .expect(2)
            .mount(&server)
            .await;

        let pending = PendingAlerts::default();
        let layer = WebhookAlertLayer::new(format!("{}/hook", server.uri()), pending.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("transform failed");
            tracing::error!("command failed");
        });

        pending.flush().await;
        assert!(pending.0.lock().unwrap().is_empty());
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn flush_without_alerts_returns_immediately() {
        PendingAlerts::default().flush().await;
    }
}
