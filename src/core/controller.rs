// src/core/controller.rs — Single-flight bulk-action session controller
//
// Phases: Idle -> Starting -> Streaming -> Terminating -> Idle.
// Records are only accepted while Streaming. Teardown (disarm deadline,
// close transport, clear busy) happens on the Streaming -> Terminating edge,
// so whichever of done / transport error / timeout / cancel comes first wins
// and the rest are no-ops.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use super::interpreter::interpret;
use super::sink::ProgressSink;
use super::types::{ActionSpec, EventRecord, Identity, ProgressState, Severity, StartRequest};
use crate::infra::config::SessionConfig;
use crate::infra::errors::{BulkOpsError, RejectReason};
use crate::transport::{Transport, TransportEvent, TransportFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Starting,
    Streaming,
    Terminating,
}

/// Identifies a started session in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: Uuid,
    pub action: String,
}

struct ActiveSession {
    handle: SessionHandle,
    label: String,
    transport: Box<dyn Transport>,
    deadline: Instant,
}

enum Step {
    Event(Option<TransportEvent>),
    Timeout,
    Cancel,
}

pub struct SessionController<S: ProgressSink> {
    factory: Arc<dyn TransportFactory>,
    config: SessionConfig,
    sink: S,
    identity: Option<Identity>,
    branch_id: Option<String>,
    phase: Phase,
    active: Option<ActiveSession>,
    progress: ProgressState,
}

impl<S: ProgressSink> SessionController<S> {
    pub fn new(factory: Arc<dyn TransportFactory>, config: SessionConfig, sink: S) -> Self {
        Self {
            factory,
            config,
            sink,
            identity: None,
            branch_id: None,
            phase: Phase::Idle,
            active: None,
            progress: ProgressState::default(),
        }
    }

    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_branch(mut self, branch_id: Option<String>) -> Self {
        self.branch_id = branch_id;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    fn label(&self) -> String {
        self.active
            .as_ref()
            .map(|a| a.label.clone())
            .unwrap_or_default()
    }

    /// Check whether `action` could start right now, without side effects.
    pub fn preflight(&self, action: &ActionSpec) -> Result<(), RejectReason> {
        if self.phase != Phase::Idle {
            return Err(RejectReason::Busy);
        }
        if self.identity.is_none() {
            return Err(RejectReason::NotAuthenticated);
        }
        if action.branch_filter && self.branch_id.is_none() {
            return Err(RejectReason::ScopeRequired);
        }
        Ok(())
    }

    fn reject(reason: RejectReason, action: &ActionSpec) -> BulkOpsError {
        tracing::debug!(action = %action.name, "start rejected: {reason}");
        BulkOpsError::Rejected(reason)
    }

    /// Open a session for `action`. Rejected (never queued) while another
    /// session is active, without a login, or without a branch when the
    /// action needs one. A rejection leaves the sink untouched; the caller
    /// reports the returned reason.
    pub fn start(&mut self, action: &ActionSpec) -> Result<SessionHandle, BulkOpsError> {
        if let Err(reason) = self.preflight(action) {
            return Err(Self::reject(reason, action));
        }
        let Some(identity) = self.identity.clone() else {
            return Err(Self::reject(RejectReason::NotAuthenticated, action));
        };

        self.phase = Phase::Starting;
        self.progress.reset();
        self.sink.reset_progress();
        self.sink.set_busy(true);
        self.sink
            .append_log_line(&format!("Starting {}...", action.label), Severity::Info);
        self.sink.show_progress_surface();
        self.sink
            .set_progress(0, 0, &format!("Preparing {}...", action.label));

        let request = StartRequest::new(&identity, action, self.branch_id.as_deref());
        let transport = match self.factory.open(&request) {
            Ok(t) => t,
            Err(e) => {
                self.sink.append_log_line(
                    &format!("Could not open stream for {}: {e}", action.label),
                    Severity::Error,
                );
                self.sink.set_busy(false);
                self.phase = Phase::Idle;
                return Err(e);
            }
        };

        let handle = SessionHandle {
            id: Uuid::new_v4(),
            action: action.name.clone(),
        };
        tracing::info!(session = %handle.id, action = %action.name, "session started");
        self.active = Some(ActiveSession {
            handle: handle.clone(),
            label: action.label.clone(),
            transport,
            deadline: Instant::now() + self.timeout(),
        });
        self.phase = Phase::Streaming;
        Ok(handle)
    }

    pub fn on_opened(&mut self) {
        if self.phase != Phase::Streaming {
            return;
        }
        let label = self.label();
        self.sink.append_log_line(
            &format!("Connected to server for {label}."),
            Severity::Info,
        );
    }

    /// Route one raw payload. Ignored outside `Streaming`.
    pub fn on_record(&mut self, payload: &str) {
        if self.phase != Phase::Streaming {
            tracing::debug!("ignoring record after teardown");
            return;
        }
        let record = match EventRecord::parse(payload) {
            Ok(r) => r,
            Err(e) => {
                self.on_malformed(&e.to_string());
                self.sink
                    .append_log_line(&format!("Raw payload: {payload}"), Severity::Info);
                return;
            }
        };

        let label = self.label();
        let out = interpret(&record, &mut self.progress, &label, self.config.fallback_total);
        for effect in &out.effects {
            effect.apply(&mut self.sink);
        }
        if out.terminal {
            self.finish();
        }
    }

    /// A record that could not be decoded. Reported; the session continues.
    pub fn on_malformed(&mut self, message: &str) {
        self.report(BulkOpsError::RecordDecode {
            message: message.to_string(),
        });
    }

    pub fn on_transport_error(&mut self, message: &str) {
        self.report(BulkOpsError::Transport {
            message: message.to_string(),
        });
    }

    pub fn on_timeout(&mut self) {
        self.report(BulkOpsError::TimeoutExceeded {
            seconds: self.config.timeout_seconds,
        });
    }

    /// Log a session error; fatal ones end the session.
    fn report(&mut self, err: BulkOpsError) {
        if self.phase != Phase::Streaming {
            return;
        }
        let line = match &err {
            BulkOpsError::RecordDecode { message } => format!("Bad record from server: {message}"),
            BulkOpsError::Transport { message } => {
                tracing::warn!("transport error: {message}");
                format!("Connection to server failed: {message}")
            }
            other => {
                tracing::warn!("{other}");
                format!("{}: {other}.", self.label())
            }
        };
        self.sink.append_log_line(&line, Severity::Error);
        if err.is_fatal() {
            self.finish();
        }
    }

    /// Operator abort. The backend is not told; it may keep working.
    pub fn on_cancel(&mut self) {
        if self.phase != Phase::Streaming {
            return;
        }
        let label = self.label();
        self.sink.append_log_line(
            &format!("{label} cancelled by operator. The server may still be processing."),
            Severity::Error,
        );
        self.finish();
    }

    /// Tear the session down. Returns `false` (and does nothing) unless a
    /// session was streaming.
    pub fn finish(&mut self) -> bool {
        if self.phase != Phase::Streaming {
            return false;
        }
        self.phase = Phase::Terminating;

        if let Some(mut active) = self.active.take() {
            if !active.transport.is_closed() {
                active.transport.close();
            }
            tracing::info!(session = %active.handle.id, "session finished");
        }
        self.sink.set_busy(false);
        self.phase = Phase::Idle;
        true
    }

    /// Pump the transport until the session ends, racing the deadline and
    /// `cancel`.
    pub async fn drive<F>(&mut self, cancel: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        while self.phase == Phase::Streaming {
            let Some(active) = self.active.as_mut() else {
                break;
            };
            let deadline = active.deadline;

            let step = tokio::select! {
                event = active.transport.next_event() => Step::Event(event),
                _ = tokio::time::sleep_until(deadline) => Step::Timeout,
                _ = &mut cancel => Step::Cancel,
            };

            match step {
                Step::Event(Some(TransportEvent::Opened)) => self.on_opened(),
                Step::Event(Some(TransportEvent::Payload(payload))) => self.on_record(&payload),
                Step::Event(Some(TransportEvent::Malformed(message))) => {
                    self.on_malformed(&message)
                }
                Step::Event(Some(TransportEvent::Error(message))) => {
                    self.on_transport_error(&message)
                }
                Step::Event(None) => {
                    self.on_transport_error("stream closed before the action completed")
                }
                Step::Timeout => self.on_timeout(),
                Step::Cancel => self.on_cancel(),
            }
        }
    }

    /// `start` then `drive`.
    pub async fn run<F>(
        &mut self,
        action: &ActionSpec,
        cancel: F,
    ) -> Result<SessionHandle, BulkOpsError>
    where
        F: Future<Output = ()>,
    {
        let handle = self.start(action)?;
        self.drive(cancel).await;
        Ok(handle)
    }
}
