// src/cli/progress.rs — Terminal progress/log sink for bulk-action sessions

use chrono::Local;

use crate::core::sink::ProgressSink;
use crate::core::types::{ProgressState, Severity};
use crate::util::truncate_for_display;

const MAX_LINE_BYTES: usize = 400;
const BAR_WIDTH: usize = 30;

/// Writes session output to stderr so stdout stays clean for scripting.
///
/// Progress is drawn only while the surface is shown, and only redrawn when
/// the percentage or label changes.
#[derive(Debug, Default)]
pub struct TerminalSink {
    visible: bool,
    latest: Option<(u64, u64, String)>,
    last_rendered: Option<(u8, String)>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The progress line to draw now, if any.
    fn next_frame(&mut self) -> Option<String> {
        if !self.visible {
            return None;
        }
        let (processed, total, label) = self.latest.as_ref()?;
        let pct = ProgressState {
            processed: *processed,
            total: *total,
            visible: true,
        }
        .percentage();
        let key = (pct, label.clone());
        if self.last_rendered.as_ref() == Some(&key) {
            return None;
        }
        let line = format_progress_line(*processed, *total, label);
        self.last_rendered = Some(key);
        Some(line)
    }

    fn draw(&mut self) {
        if let Some(line) = self.next_frame() {
            eprintln!("{line}");
        }
    }
}

pub fn format_log_line(timestamp: &str, text: &str, severity: Severity) -> String {
    let tag = match severity {
        Severity::Info => "",
        Severity::Success => "[ok] ",
        Severity::Error => "[error] ",
    };
    format!(
        "[{timestamp}] {tag}{}",
        truncate_for_display(text, MAX_LINE_BYTES)
    )
}

pub fn format_progress_line(processed: u64, total: u64, label: &str) -> String {
    let pct = ProgressState {
        processed,
        total,
        visible: true,
    }
    .percentage();
    format!(
        "  {} {:>3}% {}",
        render_progress_bar(processed, total, BAR_WIDTH),
        pct,
        label
    )
}

/// Render a simple ASCII progress bar: [=====     ]
fn render_progress_bar(current: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return format!("[{}]", " ".repeat(width));
    }
    let clamped = current.min(max);
    let filled = ((clamped as u128 * width as u128) / max as u128) as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}

impl ProgressSink for TerminalSink {
    fn append_log_line(&mut self, text: &str, severity: Severity) {
        let now = Local::now().format("%H:%M:%S").to_string();
        eprintln!("{}", format_log_line(&now, text, severity));
    }

    fn set_progress(&mut self, processed: u64, total: u64, label: &str) {
        self.latest = Some((processed, total, label.to_string()));
        self.draw();
    }

    fn show_progress_surface(&mut self) {
        self.visible = true;
        self.draw();
    }

    fn reset_progress(&mut self) {
        self.visible = false;
        self.latest = None;
        self.last_rendered = None;
    }

    fn set_busy(&mut self, busy: bool) {
        if busy {
            eprintln!("Processing, please wait...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_tags() {
        assert_eq!(
            format_log_line("10:00:00", "Starting Delete...", Severity::Info),
            "[10:00:00] Starting Delete..."
        );
        assert_eq!(
            format_log_line("10:00:01", "[A] deleted", Severity::Success),
            "[10:00:01] [ok] [A] deleted"
        );
        assert_eq!(
            format_log_line("10:00:02", "Connection to server failed", Severity::Error),
            "[10:00:02] [error] Connection to server failed"
        );
    }

    #[test]
    fn test_log_line_truncated() {
        let long = "x".repeat(MAX_LINE_BYTES + 50);
        let line = format_log_line("10:00:00", &long, Severity::Info);
        assert!(line.ends_with("..."));
        assert!(line.len() < long.len());
    }

    #[test]
    fn test_progress_line() {
        let line = format_progress_line(25, 50, "Delete: 25/50");
        assert!(line.contains(" 50% Delete: 25/50"));
        assert!(line.contains(&format!("[{}{}]", "=".repeat(15), " ".repeat(15))));
    }

    #[test]
    fn test_progress_bar_edges() {
        assert_eq!(render_progress_bar(0, 0, 4), "[    ]");
        assert_eq!(render_progress_bar(9, 3, 4), "[====]");
        assert_eq!(render_progress_bar(0, 3, 4), "[    ]");
    }

    #[test]
    fn test_progress_hidden_until_surface_shown() {
        let mut sink = TerminalSink::new();
        sink.set_progress(1, 4, "Delete: 1/4");
        assert!(sink.next_frame().is_none());

        sink.visible = true;
        let frame = sink.next_frame().unwrap();
        assert!(frame.contains(" 25% Delete: 1/4"));
        // Same percentage and label: nothing new to draw.
        assert!(sink.next_frame().is_none());

        sink.latest = Some((2, 4, "Delete: 2/4".into()));
        assert!(sink.next_frame().unwrap().contains(" 50%"));
    }

    #[test]
    fn test_reset_hides_and_forgets() {
        let mut sink = TerminalSink::new();
        sink.show_progress_surface();
        sink.set_progress(1, 2, "x");
        assert!(sink.last_rendered.is_some());

        sink.reset_progress();
        assert!(sink.last_rendered.is_none());
        assert!(sink.latest.is_none());
        assert!(!sink.visible);
        sink.set_progress(1, 2, "x");
        assert!(sink.last_rendered.is_none());
    }
}
