// src/infra/errors.rs — Error types for bulkops

use thiserror::Error;

/// Why `start` refused to open a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Another bulk action is still streaming.
    Busy,
    /// No logged-in identity.
    NotAuthenticated,
    /// The action is branch-filtered and no branch is selected.
    ScopeRequired,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Busy => write!(f, "another bulk action is already running"),
            RejectReason::NotAuthenticated => {
                write!(f, "not logged in (run `bulkops login` first)")
            }
            RejectReason::ScopeRequired => {
                write!(f, "this action needs a branch (run `bulkops select-branch`)")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum BulkOpsError {
    // Session errors
    #[error("Rejected: {0}")]
    Rejected(RejectReason),

    #[error("Failed to decode record: {message}")]
    RecordDecode { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Timed out after {seconds}s without completion")]
    TimeoutExceeded { seconds: u64 },

    #[error("Unrecognized record kind '{kind}'")]
    UnrecognizedRecordKind { kind: String },

    // Backend errors
    #[error("Backend error: {message}")]
    Backend { message: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BulkOpsError {
    /// Fatal errors end the running session; the rest are reported and skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            BulkOpsError::RecordDecode { .. } | BulkOpsError::UnrecognizedRecordKind { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_display() {
        let e = BulkOpsError::Rejected(RejectReason::Busy);
        assert_eq!(
            e.to_string(),
            "Rejected: another bulk action is already running"
        );
    }

    #[test]
    fn test_fatality() {
        assert!(!BulkOpsError::RecordDecode {
            message: "bad".into()
        }
        .is_fatal());
        assert!(!BulkOpsError::UnrecognizedRecordKind { kind: "x".into() }.is_fatal());
        assert!(BulkOpsError::TimeoutExceeded { seconds: 300 }.is_fatal());
        assert!(BulkOpsError::Transport {
            message: "reset".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_timeout_message_distinct_from_transport() {
        let t = BulkOpsError::TimeoutExceeded { seconds: 5 }.to_string();
        let c = BulkOpsError::Transport {
            message: "closed".into(),
        }
        .to_string();
        assert_ne!(t, c);
        assert!(t.contains("5s"));
    }
}
