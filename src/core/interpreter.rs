// src/core/interpreter.rs — Maps decoded records to progress/log effects
//
// Pure: takes a record and the current progress, returns what the sink should
// show. The controller applies the effects and decides about teardown.

use super::sink::ProgressSink;
use super::types::{EventRecord, ProgressState, Severity};
use crate::infra::errors::BulkOpsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Log { text: String, severity: Severity },
    Progress { processed: u64, total: u64, label: String },
    ShowProgress,
}

impl UiEffect {
    fn log(text: impl Into<String>, severity: Severity) -> Self {
        UiEffect::Log {
            text: text.into(),
            severity,
        }
    }

    pub fn apply(&self, sink: &mut dyn ProgressSink) {
        match self {
            UiEffect::Log { text, severity } => sink.append_log_line(text, *severity),
            UiEffect::Progress {
                processed,
                total,
                label,
            } => sink.set_progress(*processed, *total, label),
            UiEffect::ShowProgress => sink.show_progress_surface(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpretation {
    pub effects: Vec<UiEffect>,
    /// The record ends the session normally.
    pub terminal: bool,
}

fn non_negative(value: i64) -> u64 {
    value.max(0) as u64
}

/// Interpret one record against the running progress.
///
/// `label` is the action's human label; `fallback_total` replaces a missing
/// or non-positive total on a `progress` record.
pub fn interpret(
    record: &EventRecord,
    progress: &mut ProgressState,
    label: &str,
    fallback_total: u64,
) -> Interpretation {
    let mut out = Interpretation {
        effects: Vec::new(),
        terminal: record.is_terminal(),
    };

    match record {
        EventRecord::Info { message } => {
            out.effects.push(UiEffect::log(message, Severity::Info));
        }
        EventRecord::Error { message } => {
            out.effects.push(UiEffect::log(message, Severity::Error));
        }
        EventRecord::Progress { total } => {
            progress.total = match total {
                Some(t) if *t > 0 => *t as u64,
                _ => fallback_total,
            };
            progress.processed = 0;
            progress.visible = true;
            out.effects.push(UiEffect::log(
                format!("Total items to process: {}", progress.total),
                Severity::Info,
            ));
            out.effects.push(UiEffect::Progress {
                processed: 0,
                total: progress.total,
                label: format!("Processing {label}..."),
            });
            out.effects.push(UiEffect::ShowProgress);
        }
        EventRecord::Log {
            id,
            message,
            status,
            processed,
            total,
        } => {
            let severity = if status.as_deref() == Some("success") {
                Severity::Success
            } else {
                Severity::Error
            };
            let text = match id {
                Some(id) => format!("[{id}] {message}"),
                None => message.clone(),
            };
            out.effects.push(UiEffect::log(text, severity));

            if let Some(p) = processed {
                progress.processed = non_negative(*p);
            }
            if let Some(t) = total {
                progress.total = non_negative(*t);
            }
            progress.visible = true;
            out.effects.push(UiEffect::Progress {
                processed: progress.processed,
                total: progress.total,
                label: format!("{label}: {}/{}", progress.processed, progress.total),
            });
        }
        EventRecord::Done { message } => {
            let text = match message {
                Some(m) => format!("Completed {label}. {m}"),
                None => format!("Completed {label}."),
            };
            out.effects.push(UiEffect::log(text, Severity::Success));
        }
        EventRecord::Unknown { kind, raw } => {
            let err = BulkOpsError::UnrecognizedRecordKind { kind: kind.clone() };
            tracing::debug!("{err}");
            out.effects
                .push(UiEffect::log(format!("{err}: {raw}"), Severity::Info));
        }
    }

    out
}
