// src/infra/session.rs — Logged-in identity persisted between invocations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::backend::types::Branch;
use crate::core::types::Identity;
use crate::infra::errors::BulkOpsError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub shop_name: String,
    pub session_id: String,
    #[serde(default)]
    pub branches: Vec<Branch>,
    pub selected_branch: Option<Branch>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(shop_name: &str, session_id: &str, branches: Vec<Branch>) -> Self {
        let now = Utc::now();
        Self {
            shop_name: shop_name.to_string(),
            session_id: session_id.to_string(),
            branches,
            selected_branch: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            shop_name: self.shop_name.clone(),
            session_id: self.session_id.clone(),
        }
    }

    pub fn find_branch(&self, id: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    pub fn select_branch(&mut self, branch: Option<Branch>) {
        self.selected_branch = branch;
        self.updated_at = Utc::now();
    }

    /// Read a stored session. A missing file means "not logged in".
    pub fn load(path: &Path) -> Result<Option<Self>, BulkOpsError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    /// Atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), BulkOpsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Returns whether a file was removed.
    pub fn clear(path: &Path) -> Result<bool, BulkOpsError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
