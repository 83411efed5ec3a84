//! Logic lõi của bảng hoạt động repository: mô hình sự kiện, ánh xạ hiển thị,
//! trạng thái feed và vòng lặp polling.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod client;
pub mod feed;
pub mod poll;
pub mod present;

pub use client::ActionsClient;
pub use feed::{FeedPhase, FeedState};
pub use poll::{FeedSink, FetchActions, PollHandle, Poller};
pub use present::{
    present_event, render_feed, ActionSentence, EntryKey, FeedView, IndicatorColor,
    SentenceSegment, TimelineEntry, WAITING_PLACEHOLDER,
};

/// Đường dẫn cố định của endpoint danh sách hoạt động.
pub const ACTIONS_PATH: &str = "/api/actions-list";

/// Chu kỳ polling mặc định (15 giây).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(15_000);

/// Cấu hình feed: địa chỉ backend và chu kỳ polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Base URL của backend, không gồm `/api/actions-list`.
    pub api_base: String,
    pub poll_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base: option_env!("ACTIVITY_API_URL").unwrap_or_default().to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl FeedConfig {
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Self::default()
        }
    }

    /// URL đầy đủ của endpoint, chấp nhận base có dấu `/` ở cuối.
    pub fn actions_url(&self) -> String {
        format!("{}{ACTIONS_PATH}", self.api_base.trim_end_matches('/'))
    }
}

/// Loại hành động của một sự kiện.
///
/// Giá trị lạ được giữ nguyên trong `Other` để ghi ngược ra JSON không mất thông tin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Push,
    PullRequest,
    Merge,
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Push => "PUSH",
            ActionKind::PullRequest => "PULL_REQUEST",
            ActionKind::Merge => "MERGE",
            ActionKind::Other(value) => value,
        }
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PUSH" => ActionKind::Push,
            "PULL_REQUEST" => ActionKind::PullRequest,
            "MERGE" => ActionKind::Merge,
            _ => ActionKind::Other(value),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Một sự kiện hoạt động do backend cung cấp. Mọi trường đều tùy chọn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub action: Option<ActionKind>,
    #[serde(default)]
    pub from_branch: Option<String>,
    #[serde(default)]
    pub to_branch: Option<String>,
    /// Chuỗi thời gian đã định dạng sẵn, không phân tích lại.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ActivityEvent {
    /// Đọc một phần tử payload chỉ bằng truy cập trường tùy chọn.
    ///
    /// Phần tử không phải object cho ra sự kiện rỗng; số và bool được đổi
    /// thành chuỗi, object/mảng lồng nhau bị bỏ qua.
    pub fn from_json(row: &Value) -> Self {
        let field = |name: &str| row.get(name).and_then(scalar_text);
        Self {
            request_id: field("request_id"),
            author: field("author"),
            action: field("action").map(ActionKind::from),
            from_branch: field("from_branch"),
            to_branch: field("to_branch"),
            timestamp: field("timestamp"),
        }
    }

    /// Bảy ký tự đầu của `request_id` để hiển thị.
    pub fn short_id(&self) -> &str {
        let Some(id) = self.request_id.as_deref() else {
            return "";
        };
        match id.char_indices().nth(7) {
            Some((end, _)) => &id[..end],
            None => id,
        }
    }
}

/// Lỗi khi tải danh sách hoạt động. Mọi biến thể được xử lý như nhau.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Không gửi được request tới {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Backend trả về mã lỗi {status} cho {url}")]
    Status { url: String, status: u16 },
    #[error("Không đọc được danh sách hoạt động: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Request chưa trả lời trước nhịp polling kế tiếp, đã bỏ")]
    Superseded,
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Đọc payload JSON thành danh sách sự kiện; payload phải là một mảng,
/// từng phần tử được đọc lỏng và luôn giữ đủ số lượng.
pub fn parse_actions_str(body: &str) -> Result<Vec<ActivityEvent>, FeedError> {
    let rows: Vec<Value> = serde_json::from_str(body)?;
    Ok(rows.iter().map(ActivityEvent::from_json).collect())
}

pub fn parse_actions_value(payload: Value) -> Result<Vec<ActivityEvent>, FeedError> {
    let rows: Vec<Value> = serde_json::from_value(payload)?;
    Ok(rows.iter().map(ActivityEvent::from_json).collect())
}
