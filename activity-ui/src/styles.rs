#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-activity-feed]";

/// Default CSS for the feed along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --activity-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --activity-mono: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace;
  --activity-bg: #f8fafc;
  --activity-card-bg: rgba(255, 255, 255, 0.8);
  --activity-border: #e2e8f0;
  --activity-border-strong: #cbd5e1;
  --activity-radius: 16px;
  --activity-text: #334155;
  --activity-heading: #0f172a;
  --activity-muted: #64748b;
  --activity-faint: #94a3b8;
  --activity-indigo: #6366f1;
  --activity-indigo-text: #4f46e5;
  --activity-fuchsia: #d946ef;
  --activity-fuchsia-text: #c026d3;
  --activity-emerald: #10b981;
  --activity-emerald-text: #059669;
}

.activity-root {
  min-height: 100vh;
  background: var(--activity-bg);
  display: flex;
  justify-content: center;
  padding: 64px 24px;
  font-family: var(--activity-font-family);
  color: var(--activity-text);
  -webkit-font-smoothing: antialiased;
}

.activity-column {
  width: 100%;
  max-width: 36rem;
}

.activity-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 48px;
}

.activity-header h1 {
  margin: 0;
  font-size: 1.875rem;
  font-weight: 900;
  color: var(--activity-heading);
  letter-spacing: -0.025em;
  text-transform: lowercase;
}

.activity-header p {
  margin: 4px 0 0;
  font-size: 0.875rem;
  color: var(--activity-muted);
}

.live-badge {
  display: flex;
  align-items: center;
  gap: 8px;
  padding: 6px 12px;
  background: #ffffff;
  border: 1px solid var(--activity-border);
  border-radius: 999px;
  box-shadow: 0 1px 2px rgba(15, 23, 42, 0.05);
}

.live-dot {
  position: relative;
  display: inline-flex;
  width: 8px;
  height: 8px;
}

.live-dot::before,
.live-dot::after {
  content: '';
  position: absolute;
  inset: 0;
  border-radius: 999px;
  background: var(--activity-emerald);
}

.live-dot::before {
  opacity: 0.75;
  animation: activity-ping 1s cubic-bezier(0, 0, 0.2, 1) infinite;
}

.live-label {
  font-size: 10px;
  font-weight: 700;
  color: #475569;
  text-transform: uppercase;
  letter-spacing: 0.1em;
}

.activity-timeline {
  position: relative;
  border-left: 2px solid var(--activity-border);
  margin-left: 16px;
  display: flex;
  flex-direction: column;
  gap: 40px;
}

.activity-entry {
  position: relative;
  padding-left: 40px;
}

.activity-indicator {
  position: absolute;
  left: -11px;
  top: 6px;
  width: 20px;
  height: 20px;
  box-sizing: border-box;
  border-radius: 999px;
  border: 4px solid var(--activity-bg);
  box-shadow: 0 1px 2px rgba(15, 23, 42, 0.08);
  transition: transform 150ms ease;
}

.activity-entry:hover .activity-indicator {
  transform: scale(1.25);
}

.activity-indicator.indicator-indigo { background: var(--activity-indigo); }
.activity-indicator.indicator-fuchsia { background: var(--activity-fuchsia); }
.activity-indicator.indicator-emerald { background: var(--activity-emerald); }

.activity-card {
  background: var(--activity-card-bg);
  backdrop-filter: blur(12px);
  padding: 24px;
  border-radius: var(--activity-radius);
  border: 1px solid var(--activity-border);
  box-shadow: 0 1px 2px rgba(15, 23, 42, 0.05);
  transition: box-shadow 150ms ease, border-color 150ms ease;
}

.activity-card:hover {
  border-color: var(--activity-border-strong);
  box-shadow: 0 4px 12px rgba(15, 23, 42, 0.08);
}

.activity-line {
  display: flex;
  flex-wrap: wrap;
  align-items: baseline;
  gap: 6px;
  line-height: 1.6;
}

.activity-author {
  font-size: 1.125rem;
  font-weight: 700;
  color: var(--activity-heading);
  letter-spacing: -0.025em;
  text-transform: lowercase;
}

.activity-sentence {
  font-size: 0.875rem;
}

.sentence-verb { font-weight: 700; }
.sentence-verb.indicator-indigo { color: var(--activity-indigo-text); }
.sentence-verb.indicator-fuchsia { color: var(--activity-fuchsia-text); }
.sentence-verb.indicator-emerald { color: var(--activity-emerald-text); }

.branch-chip {
  padding: 2px 6px;
  background: #f1f5f9;
  border: 1px solid var(--activity-border);
  border-radius: 4px;
  color: var(--activity-heading);
  font-family: var(--activity-mono);
  font-size: 0.875rem;
  font-weight: 600;
}

.activity-footer {
  margin-top: 16px;
  padding-top: 16px;
  border-top: 1px solid #f8fafc;
  display: flex;
  justify-content: space-between;
  align-items: center;
}

.activity-timestamp {
  font-size: 10px;
  font-weight: 700;
  color: var(--activity-faint);
  text-transform: uppercase;
  letter-spacing: 0.1em;
}

.activity-id {
  font-size: 9px;
  font-family: var(--activity-mono);
  font-style: italic;
  color: #cbd5e1;
  background: #f8fafc;
  padding: 2px 8px;
  border-radius: 4px;
}

.activity-waiting {
  margin-left: 40px;
  padding: 64px 0;
  text-align: center;
  background: #ffffff;
  border: 1px dashed var(--activity-border-strong);
  border-radius: var(--activity-radius);
}

.activity-waiting p {
  margin: 0;
  color: var(--activity-faint);
  font-weight: 500;
  animation: activity-pulse 2s cubic-bezier(0.4, 0, 0.6, 1) infinite;
}

@keyframes activity-ping {
  75%, 100% {
    transform: scale(2);
    opacity: 0;
  }
}

@keyframes activity-pulse {
  50% { opacity: 0.5; }
}

@media (max-width: 640px) {
  .activity-root {
    padding: 32px 16px;
  }

  .activity-header {
    flex-direction: column;
    align-items: flex-start;
    gap: 16px;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-activity-feed", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
