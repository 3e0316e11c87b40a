// src/backend/mod.rs — JSON calls to the bulk-action backend (login, branch selection)

pub mod types;

use std::time::Duration;

use crate::infra::errors::BulkOpsError;
use types::{AckResponse, LoginOutcome, LoginRequest, LoginResponse, SelectBranchRequest};

pub const LOGIN_PATH: &str = "/api/login";
pub const SELECT_BRANCH_PATH: &str = "/api/select_branch";

/// Join the backend base URL and an absolute API path.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<url::Url, BulkOpsError> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), path);
    url::Url::parse(&joined)
        .map_err(|e| BulkOpsError::Config(format!("invalid backend url '{base_url}': {e}")))
}

pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, BulkOpsError> {
        // Validate once up front so later calls only fail on the network.
        endpoint_url(base_url, LOGIN_PATH)?;
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    pub async fn login(
        &self,
        shop_name: &str,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, BulkOpsError> {
        let body = LoginRequest {
            shop_name,
            username,
            password,
        };
        let (status, resp): (reqwest::StatusCode, LoginResponse) =
            self.post_json(LOGIN_PATH, &body).await?;

        match resp.session_id {
            Some(session_id) if status.is_success() && resp.success => {
                tracing::info!(shop = shop_name, branches = resp.branches.len(), "logged in");
                Ok(LoginOutcome {
                    session_id,
                    message: resp.message.unwrap_or_else(|| "Logged in.".into()),
                    branches: resp.branches,
                })
            }
            _ => Err(BulkOpsError::Backend {
                message: format!(
                    "login failed: {}",
                    failure_message(resp.message, status)
                ),
            }),
        }
    }

    /// Returns the backend's confirmation message.
    pub async fn select_branch(
        &self,
        shop_name: &str,
        session_id: &str,
        branch_id: &str,
    ) -> Result<String, BulkOpsError> {
        let body = SelectBranchRequest {
            shop_name,
            session_id,
            branch_id,
        };
        let (status, resp): (reqwest::StatusCode, AckResponse) =
            self.post_json(SELECT_BRANCH_PATH, &body).await?;

        if status.is_success() && resp.success {
            Ok(resp
                .message
                .unwrap_or_else(|| format!("Branch {branch_id} selected.")))
        } else {
            Err(BulkOpsError::Backend {
                message: format!(
                    "branch selection failed: {}",
                    failure_message(resp.message, status)
                ),
            })
        }
    }

    /// POST a JSON body and decode a JSON reply, whatever the status code.
    /// An undecodable reply is reported with the HTTP status.
    async fn post_json<B, R>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(reqwest::StatusCode, R), BulkOpsError>
    where
        B: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let url = endpoint_url(&self.base_url, path)?;
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str(&text) {
            Ok(parsed) => Ok((status, parsed)),
            Err(e) => {
                tracing::debug!("undecodable reply from {path}: {e}");
                Err(BulkOpsError::Backend {
                    message: format!("unexpected reply from {path} ({status})"),
                })
            }
        }
    }
}

fn failure_message(message: Option<String>, status: reqwest::StatusCode) -> String {
    message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}
