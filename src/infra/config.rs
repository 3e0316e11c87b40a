// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::types::ActionSpec;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// Bulk actions the operator can run, one `[[actions]]` table each.
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    /// Applies to login and branch selection, never to a streaming session.
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".into(),
            request_timeout_seconds: 30,
        }
    }
}

/// How the progress stream is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    /// `GET` with query parameters, server pushes `text/event-stream`.
    #[default]
    EventSubscription,
    /// `POST` with a JSON body, response body read chunk by chunk.
    ChunkedPull,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::EventSubscription => write!(f, "event-subscription"),
            TransportKind::ChunkedPull => write!(f, "chunked-pull"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub timeout_seconds: u64,
    pub transport: TransportKind,
    /// Total used when a `progress` record carries no positive total.
    pub fallback_total: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 300,
            transport: TransportKind::default(),
            fallback_total: 100,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        let config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BULKOPS_BACKEND_URL`, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("BULKOPS_BACKEND_URL") {
            if !url.trim().is_empty() {
                self.backend.url = url.trim().to_string();
            }
        }
        self
    }

    fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.backend.url)
            .map_err(|e| anyhow::anyhow!("backend.url '{}': {}", self.backend.url, e))?;
        if self.session.timeout_seconds == 0 {
            anyhow::bail!("session.timeout_seconds must be positive");
        }
        let mut seen = std::collections::HashSet::new();
        for action in &self.actions {
            if !seen.insert(action.name.as_str()) {
                anyhow::bail!("duplicate action name '{}'", action.name);
            }
        }
        Ok(())
    }

    pub fn find_action(&self, name: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.backend.url, "http://localhost:5000");
        assert_eq!(c.backend.request_timeout_seconds, 30);
        assert_eq!(c.session.timeout_seconds, 300);
        assert_eq!(c.session.transport, TransportKind::EventSubscription);
        assert_eq!(c.session.fallback_total, 100);
        assert!(c.actions.is_empty());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.session.timeout_seconds, 300);
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config: Config = toml::from_str(
            "[backend]\nurl = \"http://10.0.0.5:5000\"\n\n[session]\ntransport = \"chunked-pull\"\n",
        )
        .unwrap();
        assert_eq!(config.backend.url, "http://10.0.0.5:5000");
        assert_eq!(config.backend.request_timeout_seconds, 30);
        assert_eq!(config.session.transport, TransportKind::ChunkedPull);
        assert_eq!(config.session.timeout_seconds, 300);
        assert_eq!(config.session.fallback_total, 100);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[backend]
url = "https://tool-api.example.com"
request_timeout_seconds = 10

[session]
timeout_seconds = 120
transport = "chunked-pull"
fallback_total = 50

[[actions]]
name = "delete-invoices"
label = "Delete invoices"
endpoint = "invoices"
action = "delete"
branch_filter = true

[[actions]]
name = "cancel-orders"
label = "Cancel orders"
endpoint = "orders"
action = "cancel"
extra_param = "status=2"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.url, "https://tool-api.example.com");
        assert_eq!(config.session.transport, TransportKind::ChunkedPull);
        assert_eq!(config.session.fallback_total, 50);
        assert_eq!(config.actions.len(), 2);

        let invoices = config.find_action("delete-invoices").unwrap();
        assert!(invoices.branch_filter);
        assert!(invoices.extra_param.is_none());

        let orders = config.find_action("cancel-orders").unwrap();
        assert!(!orders.branch_filter);
        assert_eq!(orders.extra_param.as_deref(), Some("status=2"));
        assert!(config.find_action("nope").is_none());
    }

    #[test]
    fn test_load_from_rejects_duplicate_actions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[[actions]]
name = "a"
label = "A"
endpoint = "x"
action = "delete"

[[actions]]
name = "a"
label = "A again"
endpoint = "y"
action = "delete"
"#,
        )
        .unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate action name"));
    }

    #[test]
    fn test_load_from_rejects_bad_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nurl = \"not a url\"\nrequest_timeout_seconds = 5\n")
            .unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_transport_kind_display() {
        assert_eq!(
            TransportKind::EventSubscription.to_string(),
            "event-subscription"
        );
        assert_eq!(TransportKind::ChunkedPull.to_string(), "chunked-pull");
    }
}
