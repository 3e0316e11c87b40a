// src/cli/account.rs — login, logout, status, branch listing and selection

use std::time::Duration;

use crate::backend::types::Branch;
use crate::backend::BackendClient;
use crate::infra::config::Config;
use crate::infra::paths;
use crate::infra::session::StoredSession;

fn backend_client(config: &Config) -> anyhow::Result<BackendClient> {
    Ok(BackendClient::new(
        &config.backend.url,
        Duration::from_secs(config.backend.request_timeout_seconds),
    )?)
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v.trim().to_string()),
        None => Ok(inquire::Text::new(prompt).prompt()?.trim().to_string()),
    }
}

/// Load the stored session or explain how to get one.
pub fn require_session() -> anyhow::Result<StoredSession> {
    StoredSession::load(&paths::session_file_path())?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `bulkops login` first."))
}

pub async fn run_login(
    config: &Config,
    shop: Option<String>,
    username: Option<String>,
) -> anyhow::Result<()> {
    let shop = prompt_if_missing(shop, "Shop name:")?;
    let username = prompt_if_missing(username, "Username:")?;
    let password = match std::env::var("BULKOPS_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => inquire::Password::new("Password:")
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?,
    };

    if shop.is_empty() || username.is_empty() || password.trim().is_empty() {
        anyhow::bail!("Shop name, username and password are all required.");
    }

    let client = backend_client(config)?;
    eprintln!("Logging in to shop {shop}...");

    // A failed login must not leave an older session behind.
    let path = paths::session_file_path();
    let outcome = match client.login(&shop, &username, password.trim()).await {
        Ok(o) => o,
        Err(e) => {
            StoredSession::clear(&path)?;
            return Err(e.into());
        }
    };

    paths::ensure_dirs().await?;
    let session = StoredSession::new(&shop, &outcome.session_id, outcome.branches);
    session.save(&path)?;

    println!("{}", outcome.message);
    if session.branches.is_empty() {
        println!("No branches found, or the branch list could not be loaded.");
    } else {
        print_branches(&session);
        println!();
        println!("Select one with `bulkops select-branch <id>`.");
    }
    Ok(())
}

pub fn run_logout() -> anyhow::Result<()> {
    if StoredSession::clear(&paths::session_file_path())? {
        println!("Logged out.");
    } else {
        println!("No stored session.");
    }
    Ok(())
}

pub fn show_status(config: &Config) -> anyhow::Result<()> {
    println!("  Backend:   {}", config.backend.url);
    println!("  Transport: {}", config.session.transport);
    println!("  Timeout:   {}s", config.session.timeout_seconds);
    println!("  Actions:   {}", config.actions.len());

    match StoredSession::load(&paths::session_file_path())? {
        Some(session) => {
            println!("  Shop:      {}", session.shop_name);
            println!(
                "  Logged in: {}",
                session.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            match session.selected_branch {
                Some(ref b) => println!("  Branch:    {} ({})", b.name, b.id),
                None => println!("  Branch:    (none selected)"),
            }
        }
        None => println!("  Not logged in."),
    }
    Ok(())
}

fn print_branches(session: &StoredSession) {
    let selected = session.selected_branch.as_ref().map(|b| b.id.as_str());
    for branch in &session.branches {
        let marker = if Some(branch.id.as_str()) == selected {
            "*"
        } else {
            " "
        };
        println!("  {marker} {:<8} {}", branch.id, branch.name);
    }
}

pub fn run_branches() -> anyhow::Result<()> {
    let session = require_session()?;
    if session.branches.is_empty() {
        println!("No branches known for shop {}.", session.shop_name);
    } else {
        print_branches(&session);
    }
    Ok(())
}

fn pick_branch(session: &StoredSession, id: Option<String>) -> anyhow::Result<Branch> {
    if let Some(id) = id {
        let id = id.trim().to_string();
        if id.is_empty() {
            anyhow::bail!("Branch id must not be empty.");
        }
        return Ok(session.find_branch(&id).cloned().unwrap_or(Branch {
            name: id.clone(),
            id,
        }));
    }

    if session.branches.is_empty() {
        anyhow::bail!("No branches known. Pass a branch id explicitly.");
    }
    let options: Vec<String> = session
        .branches
        .iter()
        .map(|b| format!("{} ({})", b.name, b.id))
        .collect();
    let choice = inquire::Select::new("Branch:", options.clone()).prompt()?;
    let index = options
        .iter()
        .position(|o| *o == choice)
        .ok_or_else(|| anyhow::anyhow!("no branch selected"))?;
    Ok(session.branches[index].clone())
}

pub async fn run_select_branch(config: &Config, id: Option<String>) -> anyhow::Result<()> {
    let mut session = require_session()?;
    let branch = pick_branch(&session, id)?;
    let client = backend_client(config)?;
    let path = paths::session_file_path();

    eprintln!("Selecting branch {} ({})...", branch.name, branch.id);
    match client
        .select_branch(&session.shop_name, &session.session_id, &branch.id)
        .await
    {
        Ok(message) => {
            println!("{message}");
            println!("Selected: {}", branch.name);
            session.select_branch(Some(branch));
            session.save(&path)?;
            Ok(())
        }
        Err(e) => {
            // Branch-filtered actions stay blocked until a selection succeeds.
            session.select_branch(None);
            session.save(&path)?;
            Err(e.into())
        }
    }
}
