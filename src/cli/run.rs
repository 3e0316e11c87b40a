// src/cli/run.rs — `bulkops run` and `bulkops actions`

use std::sync::Arc;

use super::account::require_session;
use super::progress::TerminalSink;
use crate::core::controller::SessionController;
use crate::core::types::ActionSpec;
use crate::infra::config::Config;
use crate::infra::errors::BulkOpsError;
use crate::transport::HttpTransportFactory;

pub fn list_actions(config: &Config) {
    if config.actions.is_empty() {
        println!("No actions configured. Add [[actions]] tables to config.toml.");
        return;
    }
    for action in &config.actions {
        let scope = if action.branch_filter {
            "branch"
        } else {
            "shop"
        };
        println!(
            "  {:<24} {:<6} {}/{}  {}",
            action.name, scope, action.endpoint, action.action, action.label
        );
    }
}

fn find_action<'a>(config: &'a Config, name: &str) -> anyhow::Result<&'a ActionSpec> {
    config.find_action(name).ok_or_else(|| {
        let known: Vec<&str> = config.actions.iter().map(|a| a.name.as_str()).collect();
        if known.is_empty() {
            anyhow::anyhow!("Unknown action '{name}'. No actions are configured.")
        } else {
            anyhow::anyhow!("Unknown action '{name}'. Configured: {}", known.join(", "))
        }
    })
}

fn confirm(action: &ActionSpec) -> anyhow::Result<bool> {
    let question = format!(
        "Are you sure you want to \"{}\"? This CANNOT be undone!",
        action.label
    );
    Ok(inquire::Confirm::new(&question)
        .with_default(false)
        .prompt()?)
}

/// Resolves on Ctrl-C. Never resolves if the signal handler can't be set up.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub async fn run_action(config: &Config, name: &str, yes: bool) -> anyhow::Result<()> {
    let action = find_action(config, name)?;
    let session = require_session()?;

    let factory = Arc::new(HttpTransportFactory::new(
        &config.backend.url,
        config.session.transport,
    )?);
    let mut controller =
        SessionController::new(factory, config.session.clone(), TerminalSink::new())
            .with_identity(Some(session.identity()))
            .with_branch(session.selected_branch.as_ref().map(|b| b.id.clone()));

    controller
        .preflight(action)
        .map_err(BulkOpsError::Rejected)?;

    if !yes && !confirm(action)? {
        eprintln!("Action cancelled by user.");
        return Ok(());
    }

    tracing::debug!(action = %action.name, transport = %config.session.transport, "running");
    controller.run(action, interrupted()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut c = Config::default();
        c.actions.push(ActionSpec {
            name: "cancel-orders".into(),
            label: "Cancel orders".into(),
            endpoint: "orders".into(),
            action: "cancel".into(),
            branch_filter: false,
            extra_param: None,
        });
        c
    }

    #[test]
    fn test_find_action_lists_known_names() {
        let c = config();
        assert!(find_action(&c, "cancel-orders").is_ok());
        let err = find_action(&c, "delete-all").unwrap_err();
        assert!(err.to_string().contains("Configured: cancel-orders"));
    }

    #[test]
    fn test_find_action_none_configured() {
        let err = find_action(&Config::default(), "x").unwrap_err();
        assert!(err.to_string().contains("No actions are configured"));
    }
}
