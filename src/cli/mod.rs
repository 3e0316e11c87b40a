// src/cli/mod.rs — CLI definition (clap derive)

pub mod account;
pub mod progress;
pub mod run;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bulkops",
    about = "Run streamed bulk actions against a shop backend",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to a shop and remember the session
    Login {
        /// Shop name (prompted when omitted)
        #[arg(long)]
        shop: Option<String>,
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session and backend settings
    Status,
    /// List branches returned at login
    Branches,
    /// Select the branch that branch-filtered actions apply to
    SelectBranch {
        /// Branch id — interactive picker if omitted
        id: Option<String>,
    },
    /// List configured bulk actions
    Actions,
    /// Run a bulk action and stream its progress
    Run {
        /// Action name from the `[[actions]]` config
        action: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["bulkops", "run", "delete-invoices", "--yes"]).unwrap();
        match cli.command {
            Commands::Run { action, yes } => {
                assert_eq!(action, "delete-invoices");
                assert!(yes);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["bulkops", "status", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/c.toml"));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_select_branch_optional_id() {
        let cli = Cli::try_parse_from(["bulkops", "select-branch"]).unwrap();
        assert!(matches!(cli.command, Commands::SelectBranch { id: None }));
        let cli = Cli::try_parse_from(["bulkops", "select-branch", "12"]).unwrap();
        assert!(matches!(cli.command, Commands::SelectBranch { id: Some(ref i) } if i == "12"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["bulkops"]).is_err());
    }
}
