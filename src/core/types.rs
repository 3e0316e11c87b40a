// src/core/types.rs — Records, progress, and action types

use serde::{Deserialize, Serialize};

use crate::infra::errors::BulkOpsError;

/// Who the backend thinks we are, as returned by login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub shop_name: String,
    pub session_id: String,
}

/// A configured bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Key used on the command line (`bulkops run <name>`).
    pub name: String,
    /// Human label used in log and progress lines.
    pub label: String,
    pub endpoint: String,
    pub action: String,
    /// Whether the backend restricts this action to the selected branch.
    #[serde(default)]
    pub branch_filter: bool,
    #[serde(default)]
    pub extra_param: Option<String>,
}

/// Outbound parameters that open a bulk-action stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub shop_name: String,
    pub session_id: String,
    pub endpoint: String,
    pub branch_filter: bool,
    pub extra_param: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
}

impl StartRequest {
    pub fn new(identity: &Identity, action: &ActionSpec, branch_id: Option<&str>) -> Self {
        Self {
            shop_name: identity.shop_name.clone(),
            session_id: identity.session_id.clone(),
            endpoint: action.endpoint.clone(),
            branch_filter: action.branch_filter,
            extra_param: action.extra_param.clone().unwrap_or_default(),
            action: action.action.clone(),
            branch_id: branch_id.map(str::to_string),
        }
    }

    /// Query-string form; `branch_id` is only present when a branch is selected.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("shop_name", self.shop_name.clone()),
            ("session_id", self.session_id.clone()),
            ("endpoint", self.endpoint.clone()),
            ("branch_filter", self.branch_filter.to_string()),
            ("extra_param", self.extra_param.clone()),
            ("action", self.action.clone()),
        ];
        if let Some(ref branch_id) = self.branch_id {
            pairs.push(("branch_id", branch_id.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// One decoded record from the progress stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    Info {
        message: String,
    },
    Error {
        message: String,
    },
    Progress {
        total: Option<i64>,
    },
    Log {
        id: Option<String>,
        message: String,
        status: Option<String>,
        processed: Option<i64>,
        total: Option<i64>,
    },
    Done {
        message: Option<String>,
    },
    /// Anything with a `type` we don't know, kept verbatim for diagnostics.
    Unknown {
        kind: String,
        raw: String,
    },
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    message: Option<String>,
    total: Option<i64>,
    processed: Option<i64>,
    id: Option<serde_json::Value>,
    status: Option<String>,
}

impl EventRecord {
    /// Parse a JSON payload. Only malformed JSON is an error; an unknown or
    /// missing `type` becomes `Unknown`.
    pub fn parse(payload: &str) -> Result<Self, BulkOpsError> {
        let wire: WireRecord =
            serde_json::from_str(payload).map_err(|e| BulkOpsError::RecordDecode {
                message: e.to_string(),
            })?;

        let message = wire.message.unwrap_or_default();
        let record = match wire.kind.as_deref() {
            Some("info") => EventRecord::Info { message },
            Some("error") => EventRecord::Error { message },
            Some("progress") => EventRecord::Progress { total: wire.total },
            Some("log") => EventRecord::Log {
                id: wire.id.map(|v| match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                }),
                message,
                status: wire.status,
                processed: wire.processed,
                total: wire.total,
            },
            Some("done") => EventRecord::Done {
                message: Some(message).filter(|m| !m.is_empty()),
            },
            other => EventRecord::Unknown {
                kind: other.unwrap_or_default().to_string(),
                raw: payload.to_string(),
            },
        };
        Ok(record)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EventRecord::Done { .. })
    }
}

/// Progress derived from `progress` and `log` records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub processed: u64,
    pub total: u64,
    pub visible: bool,
}

impl ProgressState {
    /// round(processed / total * 100), 0 when total is 0, never above 100.
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.processed as f64 / self.total as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
