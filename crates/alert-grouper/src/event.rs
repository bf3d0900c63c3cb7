//! Alertmanager webhook types and alert normalization.

use chrono::{DateTime, Utc};
use redmine::time::parse_timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Alertmanager webhook payload.
///
/// Reference: <https://prometheus.io/docs/alerting/latest/configuration/#webhook_config>
///
/// Only `alerts` matters for grouping. Alerts stay raw JSON until
/// [`RawAlert::from_value`] so one malformed alert is skipped instead of
/// rejecting the whole batch.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Receiver that matched this notification
    #[serde(default, deserialize_with = "lenient_string")]
    pub receiver: Option<String>,
    /// External URL for Alertmanager
    #[serde(default, rename = "externalURL", deserialize_with = "lenient_string")]
    pub external_url: Option<String>,
    /// Alerts in this notification
    #[serde(default, deserialize_with = "alert_list")]
    pub alerts: Vec<Value>,
}

/// Individual alert as delivered by Alertmanager.
///
/// Decoding never fails on field types: `null` maps become empty, and
/// numeric or boolean values are kept as their JSON text.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAlert {
    /// "firing" or "resolved"
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub receiver: Option<String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub starts_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ends_at: Option<String>,
    #[serde(default, rename = "generatorURL", deserialize_with = "lenient_string")]
    pub generator_url: Option<String>,
    #[serde(default, rename = "externalURL", deserialize_with = "lenient_string")]
    pub external_url: Option<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| scalar_text(value).map(|text| (key, text)))
        .collect())
}

fn alert_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(alerts) => Ok(alerts),
        _ => Ok(Vec::new()),
    }
}

impl RawAlert {
    /// Decode one entry of the webhook `alerts` array.
    pub fn from_value(value: Value) -> Result<Self, SkipReason> {
        if !value.is_object() {
            return Err(SkipReason::Malformed);
        }
        serde_json::from_value(value).map_err(|_| SkipReason::Malformed)
    }

    /// Alert name label, for logging before the alert is validated.
    #[must_use]
    pub fn name(&self) -> &str {
        self.labels.get("alertname").map_or("unknown", String::as_str)
    }

    /// Fill receiver and external URL from the envelope when the alert
    /// does not carry its own.
    #[must_use]
    pub fn inherit(mut self, payload: &WebhookPayload) -> Self {
        if self.receiver.is_none() {
            self.receiver.clone_from(&payload.receiver);
        }
        if self.external_url.is_none() {
            self.external_url.clone_from(&payload.external_url);
        }
        self
    }
}

/// Why an alert was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Malformed,
    NotFiring,
    MissingIdentity,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("alert is not a JSON object"),
            Self::NotFiring => f.write_str("status is not firing"),
            Self::MissingIdentity => f.write_str("alertname or instance is missing"),
        }
    }
}

/// A validated, firing alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertEvent {
    pub alertname: String,
    pub instance: String,
    /// Start time normalized to UTC, or the processing time when the
    /// alert had no usable `startsAt`
    pub event_time: DateTime<Utc>,
    pub status: String,
    pub receiver: String,
    /// `startsAt` exactly as received
    pub starts_at: Option<String>,
    /// `endsAt` exactly as received
    pub ends_at: Option<String>,
    pub generator_url: Option<String>,
    pub external_url: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl AlertEvent {
    /// Validate and normalize one alert.
    ///
    /// `now` is used as the event time when `startsAt` is missing or
    /// cannot be parsed.
    pub fn parse(alert: &RawAlert, now: DateTime<Utc>) -> Result<Self, SkipReason> {
        let status = alert.status.as_deref().unwrap_or_default();
        if status != "firing" {
            return Err(SkipReason::NotFiring);
        }

        let label = |key: &str| {
            alert
                .labels
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
        };
        let (Some(alertname), Some(instance)) = (label("alertname"), label("instance")) else {
            return Err(SkipReason::MissingIdentity);
        };

        let event_time = alert
            .starts_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(now);

        Ok(Self {
            alertname,
            instance,
            event_time,
            status: status.to_string(),
            receiver: alert.receiver.clone().unwrap_or_default(),
            starts_at: alert.starts_at.clone(),
            ends_at: alert.ends_at.clone(),
            generator_url: alert.generator_url.clone(),
            external_url: alert.external_url.clone(),
            labels: alert.labels.clone(),
            annotations: alert.annotations.clone(),
        })
    }

    /// One-line summary: `summary`, then `description`, then empty.
    #[must_use]
    pub fn summary(&self) -> &str {
        ["summary", "description"]
            .iter()
            .filter_map(|key| self.annotations.get(*key))
            .find(|v| !v.is_empty())
            .map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn raw(value: serde_json::Value) -> RawAlert {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_firing_alert() {
        let alert = raw(json!({
            "status": "firing",
            "labels": { "alertname": "HighCPU", "instance": "h1", "severity": "critical" },
            "annotations": { "summary": "CPU > 90%" },
            "startsAt": "2025-05-31T22:00:00+02:00",
            "generatorURL": "http://prom/graph"
        }));

        let event = AlertEvent::parse(&alert, now()).unwrap();
        assert_eq!(event.alertname, "HighCPU");
        assert_eq!(event.instance, "h1");
        assert_eq!(
            event.event_time,
            Utc.with_ymd_and_hms(2025, 5, 31, 20, 0, 0).unwrap()
        );
        assert_eq!(event.generator_url.as_deref(), Some("http://prom/graph"));
        assert_eq!(event.summary(), "CPU > 90%");
    }

    #[test]
    fn test_parse_skips_resolved_and_missing_status() {
        let resolved = raw(json!({
            "status": "resolved",
            "labels": { "alertname": "HighCPU", "instance": "h1" }
        }));
        assert_eq!(
            AlertEvent::parse(&resolved, now()),
            Err(SkipReason::NotFiring)
        );
        assert_eq!(
            AlertEvent::parse(&RawAlert::default(), now()),
            Err(SkipReason::NotFiring)
        );
    }

    #[test]
    fn test_parse_skips_missing_or_empty_identity() {
        let no_instance = raw(json!({ "status": "firing", "labels": { "alertname": "X" } }));
        let empty_name = raw(json!({
            "status": "firing",
            "labels": { "alertname": "", "instance": "h1" }
        }));

        for alert in [no_instance, empty_name] {
            assert_eq!(
                AlertEvent::parse(&alert, now()),
                Err(SkipReason::MissingIdentity)
            );
        }
    }

    #[test]
    fn test_event_time_falls_back_to_now() {
        let missing = raw(json!({
            "status": "firing",
            "labels": { "alertname": "X", "instance": "h1" }
        }));
        let garbage = raw(json!({
            "status": "firing",
            "labels": { "alertname": "X", "instance": "h1" },
            "startsAt": "not-a-time"
        }));

        assert_eq!(AlertEvent::parse(&missing, now()).unwrap().event_time, now());
        let event = AlertEvent::parse(&garbage, now()).unwrap();
        assert_eq!(event.event_time, now());
        assert_eq!(event.starts_at.as_deref(), Some("not-a-time"));
    }

    #[test]
    fn test_summary_fallbacks() {
        let mut alert = raw(json!({
            "status": "firing",
            "labels": { "alertname": "X", "instance": "h1" },
            "annotations": { "description": "long text" }
        }));
        assert_eq!(AlertEvent::parse(&alert, now()).unwrap().summary(), "long text");

        alert.annotations.clear();
        assert_eq!(AlertEvent::parse(&alert, now()).unwrap().summary(), "");
    }

    #[test]
    fn test_inherit_envelope_fields() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "receiver": "redmine",
            "externalURL": "http://alertmanager:9093",
            "alerts": [
                { "status": "firing", "labels": {} },
                { "status": "firing", "receiver": "own", "externalURL": "http://other" }
            ]
        }))
        .unwrap();

        let first = RawAlert::from_value(payload.alerts[0].clone())
            .unwrap()
            .inherit(&payload);
        assert_eq!(first.receiver.as_deref(), Some("redmine"));
        assert_eq!(first.external_url.as_deref(), Some("http://alertmanager:9093"));

        let second = RawAlert::from_value(payload.alerts[1].clone())
            .unwrap()
            .inherit(&payload);
        assert_eq!(second.receiver.as_deref(), Some("own"));
        assert_eq!(second.external_url.as_deref(), Some("http://other"));
    }

    #[test]
    fn test_payload_without_alerts_is_empty_batch() {
        let payload: WebhookPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.alerts.is_empty());

        let payload: WebhookPayload = serde_json::from_value(json!({ "alerts": null })).unwrap();
        assert!(payload.alerts.is_empty());
    }

    #[test]
    fn test_null_maps_decode_as_empty() {
        let alert = RawAlert::from_value(json!({
            "status": "firing",
            "labels": null,
            "annotations": null,
            "startsAt": null
        }))
        .unwrap();

        assert!(alert.labels.is_empty());
        assert!(alert.annotations.is_empty());
        assert_eq!(alert.starts_at, None);
        assert_eq!(
            AlertEvent::parse(&alert, now()),
            Err(SkipReason::MissingIdentity)
        );
    }

    #[test]
    fn test_non_string_values_keep_json_text() {
        let alert = RawAlert::from_value(json!({
            "status": "firing",
            "labels": { "alertname": "HighCPU", "instance": "h1", "port": 9100, "ha": true, "dc": null },
            "annotations": { "value": 97.5 }
        }))
        .unwrap();

        assert_eq!(alert.labels["port"], "9100");
        assert_eq!(alert.labels["ha"], "true");
        assert!(!alert.labels.contains_key("dc"));
        assert_eq!(alert.annotations["value"], "97.5");
        assert!(AlertEvent::parse(&alert, now()).is_ok());
    }

    #[test]
    fn test_non_object_alert_is_malformed() {
        for value in [json!("HighCPU"), json!(42), json!(null), json!([])] {
            assert_eq!(
                RawAlert::from_value(value).unwrap_err(),
                SkipReason::Malformed
            );
        }
        assert_eq!(
            SkipReason::Malformed.to_string(),
            "alert is not a JSON object"
        );
    }
}
