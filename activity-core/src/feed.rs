//! Trạng thái cục bộ của feed: luôn là payload tải thành công gần nhất.

use crate::present::{render_feed, FeedView};
use crate::ActivityEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPhase {
    #[default]
    NotYetFetched,
    HasData,
    /// Đã có dữ liệu nhưng lần tải gần nhất thất bại.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedState {
    events: Vec<ActivityEvent>,
    phase: FeedPhase,
    consecutive_failures: u32,
}

impl FeedState {
    /// Thay toàn bộ danh sách bằng payload mới.
    pub fn replace(&mut self, events: Vec<ActivityEvent>) {
        self.events = events;
        self.phase = FeedPhase::HasData;
        self.consecutive_failures = 0;
    }

    /// Ghi nhận lần tải thất bại; danh sách hiện có giữ nguyên.
    pub fn mark_failed(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.phase == FeedPhase::HasData {
            self.phase = FeedPhase::Stale;
        }
    }

    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn view(&self) -> FeedView {
        render_feed(&self.events)
    }
}
