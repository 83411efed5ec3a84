//! GitHub webhook JSON to `ActivityEvent` converter with an in-memory dedup log.

use std::collections::HashSet;

use activity_core::{ActionKind, ActivityEvent};
use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook payload is empty")]
    NoData,
    #[error("Unsupported GitHub event: {0}")]
    UnsupportedEvent(String),
    #[error("Invalid event timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },
    #[error("Could not parse webhook JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Normalize a webhook from its raw JSON body.
pub fn normalize_webhook_str(event_type: &str, body: &str) -> Result<ActivityEvent, WebhookError> {
    let payload: Value = serde_json::from_str(body)?;
    normalize_webhook(event_type, &payload)
}

/// Normalize a webhook given the `X-GitHub-Event` header value and its payload.
pub fn normalize_webhook(event_type: &str, payload: &Value) -> Result<ActivityEvent, WebhookError> {
    if payload.as_object().map_or(true, |object| object.is_empty()) {
        return Err(WebhookError::NoData);
    }

    let author = str_at(payload, &["sender", "login"]);

    let mut event = match event_type {
        "push" => normalize_push(payload)?,
        "pull_request" => normalize_pull_request(payload)?,
        other => return Err(WebhookError::UnsupportedEvent(other.to_string())),
    };
    event.author = author;
    Ok(event)
}

fn normalize_push(payload: &Value) -> Result<ActivityEvent, WebhookError> {
    let to_branch = payload
        .get("ref")
        .and_then(Value::as_str)
        .map(|reference| reference.rsplit('/').next().unwrap_or(reference).to_string());

    Ok(ActivityEvent {
        request_id: str_at(payload, &["after"]),
        action: Some(ActionKind::Push),
        to_branch,
        timestamp: Some(display_timestamp_at(payload, &["head_commit", "timestamp"])?),
        ..ActivityEvent::default()
    })
}

fn normalize_pull_request(payload: &Value) -> Result<ActivityEvent, WebhookError> {
    let pr = payload.get("pull_request").unwrap_or(&Value::Null);
    let merged = pr.get("merged").and_then(Value::as_bool).unwrap_or(false);

    Ok(ActivityEvent {
        request_id: pr.get("id").map(value_to_id),
        action: Some(if merged {
            ActionKind::Merge
        } else {
            ActionKind::PullRequest
        }),
        from_branch: str_at(pr, &["head", "ref"]),
        to_branch: str_at(pr, &["base", "ref"]),
        timestamp: Some(display_timestamp_at(pr, &["updated_at"])?),
        ..ActivityEvent::default()
    })
}

fn value_to_id(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |current, key| current.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn display_timestamp_at(value: &Value, path: &[&str]) -> Result<String, WebhookError> {
    let raw = str_at(value, path).ok_or_else(|| WebhookError::Timestamp {
        value: String::new(),
        reason: format!("missing {}", path.join(".")),
    })?;
    format_display_timestamp(&raw)
}

/// Format an RFC 3339 timestamp as e.g. `1st April 2021 - 09:30 PM UTC`.
pub fn format_display_timestamp(raw: &str) -> Result<String, WebhookError> {
    let parsed = DateTime::parse_from_rfc3339(raw).map_err(|err| WebhookError::Timestamp {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;
    let utc = parsed.with_timezone(&Utc);
    let day = utc.day();

    Ok(format!(
        "{day}{} {}",
        day_suffix(day),
        utc.format("%B %Y - %I:%M %p UTC")
    ))
}

fn day_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Outcome of recording an event into an [`ActivityLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Stored,
    Duplicate,
}

/// Stored events, deduplicated on `(request_id, action)`.
#[derive(Debug, Default)]
pub struct ActivityLog {
    seen: HashSet<(Option<String>, Option<ActionKind>)>,
    events: Vec<ActivityEvent>,
}

impl ActivityLog {
    pub fn record(&mut self, event: ActivityEvent) -> RecordOutcome {
        let key = (event.request_id.clone(), event.action.clone());
        if !self.seen.insert(key) {
            return RecordOutcome::Duplicate;
        }
        self.events.push(event);
        RecordOutcome::Stored
    }

    /// Newest first, matching what `/api/actions-list` serves.
    pub fn list(&self) -> Vec<ActivityEvent> {
        self.events.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pull_request(merged: bool) -> Value {
        json!({
            "action": "closed",
            "sender": { "login": "octocat" },
            "pull_request": {
                "id": 1_296_269_001u64,
                "merged": merged,
                "head": { "ref": "feature-x" },
                "base": { "ref": "main" },
                "updated_at": "2021-04-02T14:05:00Z"
            }
        })
    }

    #[test]
    fn day_suffixes() {
        let cases = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (31, "st"),
        ];
        for (day, suffix) in cases {
            assert_eq!(day_suffix(day), suffix, "day {day}");
        }
    }

    #[test]
    fn timestamp_is_converted_to_utc() {
        assert_eq!(
            format_display_timestamp("2021-04-01T21:30:00Z").expect("valid"),
            "1st April 2021 - 09:30 PM UTC"
        );
        assert_eq!(
            format_display_timestamp("2021-04-12T09:05:00+05:30").expect("valid"),
            "12th April 2021 - 03:35 AM UTC"
        );
        assert!(matches!(
            format_display_timestamp("yesterday"),
            Err(WebhookError::Timestamp { .. })
        ));
    }

    #[test]
    fn unmerged_pull_request() {
        let event = normalize_webhook("pull_request", &pull_request(false)).expect("valid");
        assert_eq!(event.action, Some(ActionKind::PullRequest));
        assert_eq!(event.request_id.as_deref(), Some("1296269001"));
        assert_eq!(event.from_branch.as_deref(), Some("feature-x"));
        assert_eq!(event.to_branch.as_deref(), Some("main"));
        assert_eq!(event.author.as_deref(), Some("octocat"));
        assert_eq!(
            event.timestamp.as_deref(),
            Some("2nd April 2021 - 02:05 PM UTC")
        );
    }

    #[test]
    fn merged_pull_request_becomes_merge() {
        let event = normalize_webhook("pull_request", &pull_request(true)).expect("valid");
        assert_eq!(event.action, Some(ActionKind::Merge));
    }

    #[test]
    fn rejects_empty_and_unsupported_payloads() {
        assert!(matches!(
            normalize_webhook("push", &json!({})),
            Err(WebhookError::NoData)
        ));
        assert!(matches!(
            normalize_webhook("push", &Value::Null),
            Err(WebhookError::NoData)
        ));
        assert!(matches!(
            normalize_webhook("issues", &json!({ "action": "opened" })),
            Err(WebhookError::UnsupportedEvent(kind)) if kind == "issues"
        ));
        assert!(matches!(
            normalize_webhook("push", &json!({ "ref": "refs/heads/main" })),
            Err(WebhookError::Timestamp { .. })
        ));
    }

    #[test]
    fn log_deduplicates_and_lists_newest_first() {
        let mut log = ActivityLog::default();
        let opened = normalize_webhook("pull_request", &pull_request(false)).expect("valid");
        let merged = normalize_webhook("pull_request", &pull_request(true)).expect("valid");

        assert_eq!(log.record(opened.clone()), RecordOutcome::Stored);
        assert_eq!(log.record(opened.clone()), RecordOutcome::Duplicate);
        assert_eq!(log.record(merged.clone()), RecordOutcome::Stored);

        assert_eq!(log.len(), 2);
        assert_eq!(log.list(), vec![merged, opened]);
    }
}
