// src/core/sink.rs — Passive progress/log surface driven by a session

use super::types::Severity;

/// Where a session's log lines and progress go.
///
/// Implementations only render; they never feed back into the session.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressSink: Send {
    fn append_log_line(&mut self, text: &str, severity: Severity);
    fn set_progress(&mut self, processed: u64, total: u64, label: &str);
    fn show_progress_surface(&mut self);
    fn reset_progress(&mut self);
    fn set_busy(&mut self, busy: bool);
}

/// A sink that keeps everything in memory. Used by tests and by callers
/// that want to inspect the log trail after a session.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub lines: Vec<(String, Severity)>,
    pub progress: Option<(u64, u64, String)>,
    pub surface_visible: bool,
    pub busy: bool,
    pub busy_transitions: Vec<bool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_with(&self, severity: Severity) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(_, s)| *s == severity)
            .map(|(t, _)| t.as_str())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|(t, _)| t.contains(needle))
    }
}

impl ProgressSink for RecordingSink {
    fn append_log_line(&mut self, text: &str, severity: Severity) {
        self.lines.push((text.to_string(), severity));
    }

    fn set_progress(&mut self, processed: u64, total: u64, label: &str) {
        self.progress = Some((processed, total, label.to_string()));
    }

    fn show_progress_surface(&mut self) {
        self.surface_visible = true;
    }

    fn reset_progress(&mut self) {
        self.progress = None;
        self.surface_visible = false;
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        self.busy_transitions.push(busy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_filters_by_severity() {
        let mut sink = RecordingSink::new();
        sink.append_log_line("a", Severity::Info);
        sink.append_log_line("b", Severity::Error);
        sink.append_log_line("c", Severity::Error);
        assert_eq!(sink.lines_with(Severity::Error), vec!["b", "c"]);
        assert!(sink.contains("a"));
        assert!(!sink.contains("z"));
    }

    #[test]
    fn test_reset_hides_surface() {
        let mut sink = RecordingSink::new();
        sink.show_progress_surface();
        sink.set_progress(1, 2, "x");
        sink.reset_progress();
        assert!(!sink.surface_visible);
        assert!(sink.progress.is_none());
    }
}
