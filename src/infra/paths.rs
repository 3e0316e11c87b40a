// src/infra/paths.rs — Config and state locations
//
// All paths respect the BULKOPS_HOME environment variable for isolation.
// When BULKOPS_HOME is set, config and state live under that directory.
// When unset, everything lives under ~/.bulkops/.

use std::path::PathBuf;

/// Returns the BULKOPS_HOME override, if set.
fn bulkops_home() -> Option<PathBuf> {
    std::env::var_os("BULKOPS_HOME").map(PathBuf::from)
}

/// Configuration directory: $BULKOPS_HOME/ or ~/.bulkops/
pub fn config_dir() -> PathBuf {
    if let Some(home) = bulkops_home() {
        return home;
    }
    dirs_home().join(".bulkops")
}

/// Home directory, or the working directory when none can be determined.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Logged-in identity and branch selection
pub fn session_file_path() -> PathBuf {
    config_dir().join("session.json")
}

/// Ensure the config directory exists
pub async fn ensure_dirs() -> anyhow::Result<()> {
    tokio::fs::create_dir_all(config_dir()).await?;
    Ok(())
}
