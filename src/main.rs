// src/main.rs — bulkops entry point

use clap::Parser;

use bulkops::cli::run::{list_actions, run_action};
use bulkops::cli::{account, Cli, Commands};
use bulkops::infra::config::Config;
use bulkops::infra::logger;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG / BULKOPS_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?.with_env_overrides()
    } else {
        Config::load()?
    };

    match cli.command {
        Commands::Login { shop, username } => account::run_login(&config, shop, username).await,
        Commands::Logout => account::run_logout(),
        Commands::Status => account::show_status(&config),
        Commands::Branches => account::run_branches(),
        Commands::SelectBranch { id } => account::run_select_branch(&config, id).await,
        Commands::Actions => {
            list_actions(&config);
            Ok(())
        }
        Commands::Run { action, yes } => run_action(&config, &action, yes).await,
    }
}
