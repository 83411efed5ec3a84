//! Ánh xạ thuần từ danh sách sự kiện sang mô hình hiển thị timeline.

use std::fmt;

use serde::Serialize;

use crate::{ActionKind, ActivityEvent};

/// Thông báo khi chưa có sự kiện nào.
pub const WAITING_PLACEHOLDER: &str = "Waiting for GitHub events...";

/// Màu chấm chỉ báo trên timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColor {
    Indigo,
    Fuchsia,
    Emerald,
}

impl IndicatorColor {
    pub fn css_class(self) -> &'static str {
        match self {
            IndicatorColor::Indigo => "indicator-indigo",
            IndicatorColor::Fuchsia => "indicator-fuchsia",
            IndicatorColor::Emerald => "indicator-emerald",
        }
    }
}

/// Một đoạn của câu mô tả; renderer có thể nhấn mạnh động từ và tên nhánh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum SentenceSegment {
    Text(String),
    Verb(String),
    Branch(String),
}

impl SentenceSegment {
    pub fn text(&self) -> &str {
        match self {
            SentenceSegment::Text(text)
            | SentenceSegment::Verb(text)
            | SentenceSegment::Branch(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSentence {
    pub segments: Vec<SentenceSegment>,
}

impl fmt::Display for ActionSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(segment.text())?;
        }
        Ok(())
    }
}

/// Khóa hiển thị của một mục: `request_id`, hoặc vị trí khi thiếu.
///
/// Khóa không bảo đảm duy nhất: sự kiện mở và merge của cùng một pull
/// request mang chung `request_id` (backend chỉ loại trùng theo cặp
/// `request_id` + `action`), nên danh sách có khóa có thể gặp hai mục cùng khóa.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum EntryKey {
    RequestId(String),
    Position(usize),
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::RequestId(id) => f.write_str(id),
            EntryKey::Position(index) => write!(f, "{index}"),
        }
    }
}

/// Một mục trên timeline đã sẵn sàng để vẽ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub key: EntryKey,
    pub author: String,
    pub indicator: IndicatorColor,
    pub sentence: Option<ActionSentence>,
    pub timestamp: String,
    pub short_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "entries", rename_all = "snake_case")]
pub enum FeedView {
    /// Chưa có dữ liệu: hiển thị [`WAITING_PLACEHOLDER`].
    Waiting,
    Timeline(Vec<TimelineEntry>),
}

impl FeedView {
    pub fn entries(&self) -> &[TimelineEntry] {
        match self {
            FeedView::Waiting => &[],
            FeedView::Timeline(entries) => entries,
        }
    }
}

/// Dựng mô hình hiển thị cho cả feed, giữ nguyên thứ tự backend trả về.
pub fn render_feed(events: &[ActivityEvent]) -> FeedView {
    if events.is_empty() {
        return FeedView::Waiting;
    }

    FeedView::Timeline(
        events
            .iter()
            .enumerate()
            .map(|(index, event)| present_event(index, event))
            .collect(),
    )
}

pub fn present_event(index: usize, event: &ActivityEvent) -> TimelineEntry {
    let key = match event.request_id.as_deref() {
        Some(id) if !id.is_empty() => EntryKey::RequestId(id.to_string()),
        _ => EntryKey::Position(index),
    };

    TimelineEntry {
        key,
        author: event.author.clone().unwrap_or_default(),
        indicator: indicator_for(event.action.as_ref()),
        sentence: sentence_for(event),
        timestamp: event.timestamp.clone().unwrap_or_default(),
        short_id: event.short_id().to_string(),
    }
}

fn indicator_for(action: Option<&ActionKind>) -> IndicatorColor {
    match action {
        Some(ActionKind::Push) => IndicatorColor::Indigo,
        Some(ActionKind::Merge) => IndicatorColor::Fuchsia,
        Some(ActionKind::PullRequest) | Some(ActionKind::Other(_)) | None => {
            IndicatorColor::Emerald
        }
    }
}

fn sentence_for(event: &ActivityEvent) -> Option<ActionSentence> {
    let from = || branch(event.from_branch.as_deref());
    let to = || branch(event.to_branch.as_deref());

    let segments = match event.action.as_ref()? {
        ActionKind::Push => vec![verb("pushed"), text(" to "), to()],
        ActionKind::PullRequest => vec![
            text("submitted a "),
            verb("pull request"),
            text(" from "),
            from(),
            text(" to "),
            to(),
        ],
        ActionKind::Merge => vec![
            verb("merged"),
            text(" branch "),
            from(),
            text(" to "),
            to(),
        ],
        ActionKind::Other(_) => return None,
    };

    Some(ActionSentence { segments })
}

fn text(value: &str) -> SentenceSegment {
    SentenceSegment::Text(value.to_string())
}

fn verb(value: &str) -> SentenceSegment {
    SentenceSegment::Verb(value.to_string())
}

fn branch(value: Option<&str>) -> SentenceSegment {
    SentenceSegment::Branch(value.unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(action: &str, from: Option<&str>, to: &str) -> ActivityEvent {
        ActivityEvent {
            request_id: Some("c0ffee1234".to_string()),
            author: Some("octocat".to_string()),
            action: Some(ActionKind::from(action.to_string())),
            from_branch: from.map(str::to_string),
            to_branch: Some(to.to_string()),
            timestamp: Some("1st April 2021 - 09:30 PM UTC".to_string()),
        }
    }

    fn sentence(entry: &TimelineEntry) -> String {
        entry
            .sentence
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    #[test]
    fn push_sentence_omits_source_branch() {
        let entry = present_event(0, &event("PUSH", Some("feature-x"), "main"));
        assert_eq!(sentence(&entry), "pushed to main");
        assert!(!sentence(&entry).contains("feature-x"));
        assert_eq!(entry.indicator, IndicatorColor::Indigo);
    }

    #[test]
    fn pull_request_sentence() {
        let entry = present_event(0, &event("PULL_REQUEST", Some("feature-x"), "main"));
        assert_eq!(
            sentence(&entry),
            "submitted a pull request from feature-x to main"
        );
        assert_eq!(entry.indicator, IndicatorColor::Emerald);
    }

    #[test]
    fn merge_sentence() {
        let entry = present_event(0, &event("MERGE", Some("feature-x"), "main"));
        assert_eq!(sentence(&entry), "merged branch feature-x to main");
        assert_eq!(entry.indicator, IndicatorColor::Fuchsia);
    }

    #[test]
    fn unknown_action_has_no_sentence() {
        let entry = present_event(0, &event("RELEASE", None, "main"));
        assert_eq!(entry.sentence, None);
        assert_eq!(entry.indicator, IndicatorColor::Emerald);
    }

    #[test]
    fn branches_are_marked_for_emphasis() {
        let entry = present_event(0, &event("MERGE", Some("feature-x"), "main"));
        let branches: Vec<&str> = entry
            .sentence
            .iter()
            .flat_map(|s| s.segments.iter())
            .filter_map(|segment| match segment {
                SentenceSegment::Branch(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(branches, ["feature-x", "main"]);
    }

    #[test]
    fn opened_and_merged_pull_request_share_a_key() {
        let events = vec![
            event("MERGE", Some("feature-x"), "main"),
            event("PULL_REQUEST", Some("feature-x"), "main"),
        ];
        let view = render_feed(&events);

        assert_eq!(view.entries().len(), 2);
        assert_eq!(view.entries()[0].key, view.entries()[1].key);
        assert_ne!(view.entries()[0].sentence, view.entries()[1].sentence);
    }

    #[test]
    fn empty_feed_renders_placeholder() {
        let view = render_feed(&[]);
        assert_eq!(view, FeedView::Waiting);
        assert!(view.entries().is_empty());
    }

    #[test]
    fn entry_count_matches_payload_and_keys_fall_back_to_position() {
        let mut anonymous = event("PUSH", None, "dev");
        anonymous.request_id = None;
        let mut blank = event("PUSH", None, "dev");
        blank.request_id = Some(String::new());

        let events = vec![event("PUSH", None, "main"), anonymous, blank];
        let view = render_feed(&events);

        assert_eq!(view.entries().len(), events.len());
        assert_eq!(
            view.entries()[0].key,
            EntryKey::RequestId("c0ffee1234".to_string())
        );
        assert_eq!(view.entries()[0].short_id, "c0ffee1");
        assert_eq!(view.entries()[1].key, EntryKey::Position(1));
        assert_eq!(view.entries()[2].key, EntryKey::Position(2));
    }
}
