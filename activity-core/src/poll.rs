//! Vòng lặp polling độc lập runtime.
//!
//! Vòng lặp tải ngay khi khởi động, sau đó tải lại mỗi khi luồng `ticks`
//! phát một nhịp. Không bao giờ có hai request cùng lúc: request còn chờ khi
//! nhịp kế tiếp đến sẽ bị bỏ, ghi nhận là lỗi, và nhịp đó phát request mới.
//! Bộ hẹn giờ thuộc sở hữu của [`PollHandle`]; thả handle là dừng vòng lặp
//! tại điểm chờ kế tiếp.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::future::{self, AbortHandle, Abortable, Either};
use futures::{pin_mut, FutureExt, Stream, StreamExt};
use tracing::{debug, warn};

use crate::feed::FeedState;
use crate::{ActivityEvent, FeedError};

/// Nguồn dữ liệu cho một lần tải.
pub trait FetchActions {
    fn fetch_actions(&self) -> impl Future<Output = Result<Vec<ActivityEvent>, FeedError>>;
}

/// Nơi nhận kết quả của mỗi lần tải.
pub trait FeedSink {
    fn replace(&mut self, events: Vec<ActivityEvent>);

    fn fetch_failed(&mut self, _error: &FeedError) {}
}

impl FeedSink for FeedState {
    fn replace(&mut self, events: Vec<ActivityEvent>) {
        FeedState::replace(self, events);
    }

    fn fetch_failed(&mut self, _error: &FeedError) {
        self.mark_failed();
    }
}

impl<S: FeedSink + ?Sized> FeedSink for &mut S {
    fn replace(&mut self, events: Vec<ActivityEvent>) {
        (**self).replace(events);
    }

    fn fetch_failed(&mut self, error: &FeedError) {
        (**self).fetch_failed(error);
    }
}

impl<S: FeedSink> FeedSink for Rc<RefCell<S>> {
    fn replace(&mut self, events: Vec<ActivityEvent>) {
        self.borrow_mut().replace(events);
    }

    fn fetch_failed(&mut self, error: &FeedError) {
        self.borrow_mut().fetch_failed(error);
    }
}

/// Quyền sở hữu bộ hẹn giờ polling.
#[must_use = "thả PollHandle sẽ dừng vòng polling ngay lập tức"]
#[derive(Debug)]
pub struct PollHandle {
    abort: AbortHandle,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

enum NextTick {
    /// Nhịp kế tiếp chưa đến.
    Pending,
    /// Nhịp kế tiếp đã đến trong lúc tải.
    Fired,
    Exhausted,
}

pub struct Poller<F, S, T> {
    fetcher: F,
    sink: S,
    ticks: T,
}

impl<F, S, T> Poller<F, S, T>
where
    F: FetchActions,
    S: FeedSink,
    T: Stream<Item = ()> + Unpin,
{
    pub fn new(fetcher: F, sink: S, ticks: T) -> Self {
        Self {
            fetcher,
            sink,
            ticks,
        }
    }

    /// Tách vòng lặp thành handle điều khiển và future để runtime gọi thực thi.
    ///
    /// Sau khi handle bị hủy, future không còn được poll nên một request đang
    /// dở sẽ không bao giờ ghi vào sink.
    pub fn start(self) -> (PollHandle, impl Future<Output = ()>) {
        let (abort, registration) = AbortHandle::new_pair();
        let task = Abortable::new(self.run(), registration).map(|outcome| {
            if outcome.is_err() {
                debug!(event = "feed.poll.cancelled");
            }
        });
        (PollHandle { abort }, task)
    }

    async fn run(mut self) {
        loop {
            match self.poll_once().await {
                NextTick::Fired => continue,
                NextTick::Pending => {}
                NextTick::Exhausted => break,
            }
            self.skip_elapsed_ticks();
            if self.ticks.next().await.is_none() {
                break;
            }
        }
        debug!(event = "feed.poll.ticks_exhausted");
    }

    /// Một lần tải, chạy đua với nhịp kế tiếp.
    async fn poll_once(&mut self) -> NextTick {
        let fetch = self.fetcher.fetch_actions();
        pin_mut!(fetch);

        let (result, next) = match future::select(fetch, self.ticks.next()).await {
            Either::Left((result, _)) => (result, NextTick::Pending),
            Either::Right((Some(()), _)) => (Err(FeedError::Superseded), NextTick::Fired),
            Either::Right((None, fetch)) => (fetch.await, NextTick::Exhausted),
        };

        match result {
            Ok(events) => {
                debug!(event = "feed.poll.refreshed", count = events.len());
                self.sink.replace(events);
            }
            Err(err) => {
                warn!(
                    event = "feed.poll.fetch_failed",
                    error = %err,
                    "Fetch failed - keeping previous events"
                );
                self.sink.fetch_failed(&err);
            }
        }
        next
    }

    fn skip_elapsed_ticks(&mut self) {
        let mut skipped = 0usize;
        while let Some(Some(())) = self.ticks.next().now_or_never() {
            skipped += 1;
        }
        if skipped > 0 {
            debug!(event = "feed.poll.ticks_skipped", skipped);
        }
    }
}
