use std::fs;

use activity_github::normalize_webhook_str;
use serde_json::Value;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn assert_matches_golden(event_type: &str, webhook: &str, golden: &str) {
    let body = fs::read_to_string(fixture_path(webhook)).expect("Could not read webhook fixture");

    let event = normalize_webhook_str(event_type, &body).expect("Could not normalize webhook");
    let actual = serde_json::to_value(event).expect("Could not serialize event");

    let expected = fs::read_to_string(fixture_path(golden)).expect("Could not read golden event");
    let expected: Value = serde_json::from_str(&expected).expect("Golden is not valid JSON");

    assert_eq!(actual, expected);
}

#[test]
fn push_webhook_matches_golden() {
    assert_matches_golden("push", "push_webhook.json", "push_event.json");
}

#[test]
fn pull_request_webhook_matches_golden() {
    assert_matches_golden(
        "pull_request",
        "pull_request_webhook.json",
        "pull_request_event.json",
    );
}
