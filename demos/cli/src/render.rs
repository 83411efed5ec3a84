use std::fmt::Write;
use std::time::Duration;

use activity_core::{FeedView, IndicatorColor, SentenceSegment, TimelineEntry, WAITING_PLACEHOLDER};
use owo_colors::OwoColorize;

pub struct RenderOptions {
    pub color: bool,
    pub poll_interval: Duration,
}

/// Dựng toàn bộ màn hình timeline dưới dạng văn bản.
pub fn render_view(view: &FeedView, options: &RenderOptions) -> String {
    let mut out = String::new();
    let title = format!(
        "Activity  (updates every {} seconds)",
        options.poll_interval.as_secs()
    );
    let live = "● LIVE";

    if options.color {
        let _ = writeln!(out, "{}  {}", title.bold(), live.green().bold());
    } else {
        let _ = writeln!(out, "{title}  {live}");
    }

    match view {
        FeedView::Waiting => {
            let _ = writeln!(out, "  {WAITING_PLACEHOLDER}");
        }
        FeedView::Timeline(entries) => {
            for entry in entries {
                out.push_str(&render_entry(entry, options.color));
            }
        }
    }

    out
}

fn render_entry(entry: &TimelineEntry, color: bool) -> String {
    let mut line = String::new();

    if color {
        let _ = write!(line, "{} {}", paint("●", entry.indicator), format!("@{}", entry.author).bold());
    } else {
        let _ = write!(line, "● @{}", entry.author);
    }

    if let Some(sentence) = &entry.sentence {
        line.push(' ');
        for segment in &sentence.segments {
            match segment {
                SentenceSegment::Text(text) => line.push_str(text),
                SentenceSegment::Verb(text) if color => {
                    line.push_str(&paint(text, entry.indicator).bold().to_string())
                }
                SentenceSegment::Branch(name) if color => {
                    line.push_str(&name.bold().to_string())
                }
                SentenceSegment::Verb(text) | SentenceSegment::Branch(text) => {
                    line.push_str(text)
                }
            }
        }
    }

    let footer = format!("{}    ID: {}", entry.timestamp, entry.short_id);
    if color {
        format!("{line}\n  {}\n", footer.dimmed())
    } else {
        format!("{line}\n  {footer}\n")
    }
}

fn paint(text: &str, indicator: IndicatorColor) -> String {
    match indicator {
        IndicatorColor::Indigo => text.blue().to_string(),
        IndicatorColor::Fuchsia => text.magenta().to_string(),
        IndicatorColor::Emerald => text.green().to_string(),
    }
}
