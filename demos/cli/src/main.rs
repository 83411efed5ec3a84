use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use activity_core::{
    ActionsClient, ActivityEvent, FeedConfig, FeedError, FeedPhase, FeedSink, FeedState, Poller,
};
use activity_github::{normalize_webhook_str, ActivityLog, RecordOutcome};
use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::{stream, Stream};
use is_terminal::IsTerminal;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;

use render::{render_view, RenderOptions};

#[derive(Parser, Debug)]
#[command(
    name = "activity-cli",
    about = "Theo dõi hoạt động repository (push, pull request, merge) từ terminal."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll `/api/actions-list` và in lại timeline sau mỗi lần tải thành công.
    Watch {
        /// Base URL của backend.
        #[arg(long, env = "ACTIVITY_API_URL")]
        api_url: String,
        /// Chu kỳ polling tính bằng giây.
        #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
        /// Tắt màu ANSI.
        #[arg(long)]
        no_color: bool,
    },
    /// Chuyển các payload webhook GitHub thành danh sách ActivityEvent JSON,
    /// loại trùng và xếp mới nhất trước như `/api/actions-list`.
    Normalize {
        /// Giá trị header `X-GitHub-Event` (push, pull_request).
        #[arg(short, long)]
        event: String,
        /// Đường dẫn tới file JSON payload; lặp lại để nạp nhiều file theo thứ tự nhận.
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// In lại timeline mỗi khi feed được thay mới.
struct TerminalSink {
    state: FeedState,
    options: RenderOptions,
}

impl FeedSink for TerminalSink {
    fn replace(&mut self, events: Vec<ActivityEvent>) {
        self.state.replace(events);
        print!("{}", render_view(&self.state.view(), &self.options));
    }

    fn fetch_failed(&mut self, _error: &FeedError) {
        self.state.mark_failed();
        if self.state.phase() == FeedPhase::Stale {
            warn!(
                event = "cli.watch.stale",
                consecutive_failures = self.state.consecutive_failures(),
                "Timeline is showing the last successful fetch"
            );
        }
    }
}

fn interval_ticks(period: Duration) -> Pin<Box<dyn Stream<Item = ()>>> {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Box::pin(stream::unfold(interval, |mut interval| async move {
        interval.tick().await;
        Some(((), interval))
    }))
}

async fn watch(api_url: String, interval_secs: u64, no_color: bool) -> anyhow::Result<()> {
    let config = FeedConfig {
        api_base: api_url,
        poll_interval: Duration::from_secs(interval_secs),
    };
    let sink = TerminalSink {
        state: FeedState::default(),
        options: RenderOptions {
            color: !no_color && std::io::stdout().is_terminal(),
            poll_interval: config.poll_interval,
        },
    };

    info!(
        event = "cli.watch.started",
        url = %config.actions_url(),
        interval_secs
    );

    let client = ActionsClient::new(&config);
    let (_handle, task) = Poller::new(client, sink, interval_ticks(config.poll_interval)).start();

    tokio::select! {
        _ = task => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Không lắng nghe được tín hiệu Ctrl-C")?;
            info!(event = "cli.watch.stopped");
        }
    }

    Ok(())
}

fn normalize_into(log: &mut ActivityLog, event: &str, input: &Path) -> anyhow::Result<RecordOutcome> {
    let body = std::fs::read_to_string(input)
        .with_context(|| format!("Không đọc được file {input:?}"))?;

    let activity = normalize_webhook_str(event, &body)
        .with_context(|| format!("Không chuẩn hóa được webhook {event} từ {input:?}"))?;

    Ok(log.record(activity))
}

fn normalize(event: &str, inputs: &[PathBuf]) -> anyhow::Result<()> {
    let mut log = ActivityLog::default();
    for input in inputs {
        if normalize_into(&mut log, event, input)? == RecordOutcome::Duplicate {
            info!(event = "cli.normalize.duplicate", input = ?input);
        }
    }

    println!("{}", serde_json::to_string_pretty(&log.list())?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Command::Watch {
            api_url,
            interval_secs,
            no_color,
        } => watch(api_url, interval_secs, no_color).await,
        Command::Normalize { event, input } => normalize(&event, &input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}/../../activity-github/tests/data/{name}",
            env!("CARGO_MANIFEST_DIR")
        ))
    }

    #[test]
    fn repeated_webhook_is_recorded_once() {
        let mut log = ActivityLog::default();
        let push = fixture_path("push_webhook.json");

        let first = normalize_into(&mut log, "push", &push).expect("Không chuẩn hóa được push");
        let second = normalize_into(&mut log, "push", &push).expect("Không chuẩn hóa được push");
        normalize_into(&mut log, "pull_request", &fixture_path("pull_request_webhook.json"))
            .expect("Không chuẩn hóa được pull request");

        assert_eq!(first, RecordOutcome::Stored);
        assert_eq!(second, RecordOutcome::Duplicate);

        let listed = log.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].request_id.as_deref(), Some("1834475601"));
    }

    #[test]
    fn failed_fetch_after_data_marks_terminal_feed_stale() {
        let mut sink = TerminalSink {
            state: FeedState::default(),
            options: RenderOptions {
                color: false,
                poll_interval: Duration::from_secs(15),
            },
        };

        sink.fetch_failed(&FeedError::Superseded);
        assert_eq!(sink.state.phase(), FeedPhase::NotYetFetched);

        sink.replace(vec![ActivityEvent::default()]);
        sink.fetch_failed(&FeedError::Superseded);
        assert_eq!(sink.state.phase(), FeedPhase::Stale);
        assert_eq!(sink.state.consecutive_failures(), 1);
        assert_eq!(sink.state.events().len(), 1);
    }
}
