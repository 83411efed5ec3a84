//! Bridge WASM <-> JavaScript trung lập framework.

use std::time::Duration;

use activity_core::{parse_actions_value, render_feed, FeedConfig};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsFeedConfig {
    #[serde(default)]
    api_base: Option<String>,
    #[serde(default)]
    poll_interval_ms: Option<u64>,
}

impl From<JsFeedConfig> for FeedConfig {
    fn from(cfg: JsFeedConfig) -> Self {
        let mut base = FeedConfig::default();
        if let Some(api_base) = cfg.api_base {
            base.api_base = api_base;
        }
        if let Some(ms) = cfg.poll_interval_ms.filter(|ms| *ms > 0) {
            base.poll_interval = Duration::from_millis(ms);
        }
        base
    }
}

fn read_config(config: Option<JsValue>) -> Result<FeedConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsFeedConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(FeedConfig::from(cfg))
        }
        _ => Ok(FeedConfig::default()),
    }
}

/// URL đầy đủ mà feed sẽ poll với cấu hình đã cho.
#[wasm_bindgen]
pub fn actions_url(config: Option<JsValue>) -> Result<String, JsValue> {
    Ok(read_config(config)?.actions_url())
}

/// Dựng mô hình hiển thị timeline từ payload `/api/actions-list`.
#[wasm_bindgen]
pub fn present_actions(payload: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let payload = from_value::<serde_json::Value>(payload)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON payload: {err}")))?;
    let events = parse_actions_value(payload).map_err(|err| JsValue::from_str(&err.to_string()))?;

    to_value(&render_feed(&events))
        .map_err(|err| JsValue::from_str(&format!("Không serialize timeline: {err}")))
}

/// Chuẩn hóa một webhook GitHub thành `ActivityEvent`.
#[wasm_bindgen]
pub fn normalize_webhook(event_type: &str, payload: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let payload = from_value::<serde_json::Value>(payload)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON webhook: {err}")))?;

    let event = activity_github::normalize_webhook(event_type, &payload)
        .map_err(|err| JsValue::from_str(&format!("Webhook error: {err}")))?;

    to_value(&event).map_err(|err| JsValue::from_str(&format!("Không serialize sự kiện: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_merged_onto_defaults() {
        let cfg = FeedConfig::from(JsFeedConfig {
            api_base: Some("https://hooks.example.com".to_string()),
            poll_interval_ms: None,
        });
        assert_eq!(cfg.actions_url(), "https://hooks.example.com/api/actions-list");
        assert_eq!(cfg.poll_interval, Duration::from_secs(15));
    }

    #[test]
    fn zero_interval_is_ignored() {
        let cfg = FeedConfig::from(JsFeedConfig {
            api_base: None,
            poll_interval_ms: Some(0),
        });
        assert_eq!(cfg, FeedConfig::default());

        let fast = FeedConfig::from(JsFeedConfig {
            poll_interval_ms: Some(5_000),
            ..JsFeedConfig::default()
        });
        assert_eq!(fast.poll_interval, Duration::from_secs(5));
    }
}
