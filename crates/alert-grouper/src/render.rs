//! Ticket description and comment text.
//!
//! Labels and annotations are rendered from ordered maps, so the same alert
//! always produces byte-identical text.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::event::AlertEvent;

/// Description for a new host or child ticket, laid out like the
/// Alertmanager UI: overview, labels, annotations.
#[must_use]
pub fn issue_description(event: &AlertEvent) -> String {
    let field = |value: Option<&String>| value.map_or("", String::as_str).to_string();

    let mut text = String::new();
    text.push_str("Alert Overview\n");
    text.push_str("--------------\n");
    let _ = writeln!(text, "- status: {}", event.status);
    let _ = writeln!(text, "- receiver: {}", event.receiver);
    let _ = writeln!(text, "- startsAt: {}", field(event.starts_at.as_ref()));
    let _ = writeln!(text, "- endsAt: {}", field(event.ends_at.as_ref()));
    let _ = writeln!(text, "- generatorURL: {}", field(event.generator_url.as_ref()));
    let _ = writeln!(text, "- externalURL: {}", field(event.external_url.as_ref()));
    text.push('\n');

    text.push_str("Labels\n");
    text.push_str("------\n");
    text.push_str(&json_block(&event.labels));
    text.push_str("\n\n");

    text.push_str("Annotations\n");
    text.push_str("-----------\n");
    text.push_str(&json_block(&event.annotations));
    text.push('\n');

    text
}

/// Description for the root ticket of a cluster.
#[must_use]
pub fn root_description(alertname: &str) -> String {
    format!(
        "Parent ticket for {alertname}. Each affected host is tracked as a child ticket."
    )
}

/// Comment appended when an alert fires again for a host that already has
/// a live ticket.
#[must_use]
pub fn recurrence_comment(event: &AlertEvent) -> String {
    let started = event
        .starts_at
        .clone()
        .unwrap_or_else(|| event.event_time.to_rfc3339());

    format!(
        "[Recurrence] alertname={}, instance={}\nstartsAt : {}\nsummary  : {}",
        event.alertname,
        event.instance,
        started,
        event.summary()
    )
}

fn json_block(map: &BTreeMap<String, String>) -> String {
    // A map of strings always serializes
    serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RawAlert;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn event(value: serde_json::Value) -> AlertEvent {
        let raw: RawAlert = serde_json::from_value(value).unwrap();
        AlertEvent::parse(&raw, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_issue_description_layout() {
        let event = event(json!({
            "status": "firing",
            "receiver": "redmine",
            "labels": { "instance": "h1", "alertname": "HighCPU" },
            "annotations": { "summary": "CPU > 90%" },
            "startsAt": "2025-05-31T23:00:00Z",
            "generatorURL": "http://prom/graph"
        }));

        let expected = "Alert Overview\n\
                        --------------\n\
                        - status: firing\n\
                        - receiver: redmine\n\
                        - startsAt: 2025-05-31T23:00:00Z\n\
                        - endsAt: \n\
                        - generatorURL: http://prom/graph\n\
                        - externalURL: \n\
                        \n\
                        Labels\n\
                        ------\n\
                        {\n  \"alertname\": \"HighCPU\",\n  \"instance\": \"h1\"\n}\n\
                        \n\
                        Annotations\n\
                        -----------\n\
                        {\n  \"summary\": \"CPU > 90%\"\n}\n";
        assert_eq!(issue_description(&event), expected);
    }

    #[test]
    fn test_issue_description_is_deterministic() {
        let value = json!({
            "status": "firing",
            "labels": { "z": "1", "alertname": "A", "instance": "h", "m": "2" },
            "annotations": { "b": "x", "a": "y" }
        });
        assert_eq!(
            issue_description(&event(value.clone())),
            issue_description(&event(value))
        );
    }

    #[test]
    fn test_empty_annotations_render_as_empty_object() {
        let event = event(json!({
            "status": "firing",
            "labels": { "alertname": "A", "instance": "h" }
        }));
        assert!(issue_description(&event).ends_with("Annotations\n-----------\n{}\n"));
    }

    #[test]
    fn test_recurrence_comment() {
        let event = event(json!({
            "status": "firing",
            "labels": { "alertname": "HighCPU", "instance": "h1" },
            "annotations": { "description": "load is high" },
            "startsAt": "2025-05-31T23:10:00Z"
        }));

        assert_eq!(
            recurrence_comment(&event),
            "[Recurrence] alertname=HighCPU, instance=h1\n\
             startsAt : 2025-05-31T23:10:00Z\n\
             summary  : load is high"
        );
    }

    #[test]
    fn test_recurrence_comment_without_start_uses_event_time() {
        let event = event(json!({
            "status": "firing",
            "labels": { "alertname": "HighCPU", "instance": "h1" }
        }));
        assert!(recurrence_comment(&event).contains("startsAt : 2025-06-01T00:00:00+00:00"));
    }

    #[test]
    fn test_root_description_names_alert() {
        assert!(root_description("HighCPU").contains("HighCPU"));
    }
}
