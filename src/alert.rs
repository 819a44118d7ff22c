//! Webhook alerting on slow or failing events.
//!
//! Per §7 "Alerting": when `RAG_ALERT_WEBHOOK` is set, emit an alert if an
//! event's `latency_*_ms` field exceeds `RAG_ALERT_LATENCY_MS` (when both
//! are set) or if the event name ends in `_error`. This is a contract-only
//! external collaborator (§1 scope): the POST itself is a thin, best-effort
//! call whose failure is swallowed — alerting must never fail the pipeline
//! it is observing.

use serde_json::Value;

/// Evaluates events against the alert policy and POSTs matches to a webhook.
#[derive(Debug, Clone)]
pub struct AlertSink {
    webhook: String,
    latency_threshold_ms: Option<u64>,
    client: reqwest::blocking::Client,
}

impl AlertSink {
    /// Builds a sink from config, or returns `None` if no webhook is set.
    #[must_use]
    pub fn from_config(webhook: Option<&str>, latency_threshold_ms: Option<u64>) -> Option<Self> {
        let webhook = webhook?.to_string();
        Some(Self {
            webhook,
            latency_threshold_ms,
            client: reqwest::blocking::Client::new(),
        })
    }

    /// Checks `event`/`fields` against the alert policy and fires if matched.
    pub fn maybe_alert(&self, event: &str, fields: &Value) {
        if self.should_alert(event, fields) {
            let _ = self
                .client
                .post(&self.webhook)
                .json(fields)
                .timeout(std::time::Duration::from_secs(5))
                .send();
        }
    }

    /// Pure decision logic, kept separate from the HTTP call so it can be
    /// unit-tested without a network dependency.
    #[must_use]
    pub fn should_alert(&self, event: &str, fields: &Value) -> bool {
        if event.ends_with("_error") {
            return true;
        }
        let Some(threshold) = self.latency_threshold_ms else {
            return false;
        };
        let Some(obj) = fields.as_object() else {
            return false;
        };
        obj.iter().any(|(k, v)| {
            k.starts_with("latency_")
                && k.ends_with("_ms")
                && v.as_u64().is_some_and(|ms| ms > threshold)
        })
    }
}
