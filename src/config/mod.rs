mod settings;
mod state;

pub use settings::{AffiliateSettings, ApiSettings, BillingSettings, Config, League, PlanSettings};
pub use state::{Counter, State};

use crate::error::{BillingError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.league/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "league") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.league/
    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        BillingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".league"))
}

/// Fail early when the config directory has not been initialized
pub fn ensure_initialized(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        return Err(BillingError::ConfigNotFound(config_dir.to_path_buf()));
    }
    Ok(())
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(BillingError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BillingError::ConfigParse { path, source: e })
}

/// Load state.toml (creates default if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BillingError::ConfigParse { path, source: e })
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state)?;
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), "state saved");
    Ok(())
}

/// Create the config directory and write config.toml from the template
pub fn init_config_dir(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        return Err(BillingError::AlreadyInitialized(config_dir.to_path_buf()));
    }
    fs::create_dir_all(config_dir)?;
    fs::write(config_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    save_state(config_dir, &State::default())?;
    tracing::info!(path = %config_dir.display(), "config directory initialized");
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[league]
name = "Your Basketball League"
email = "billing@yourleague.org"
# address = "100 Court Street, Springfield"   # optional
# phone = "+1-555-123-4567"                   # optional

[billing]
number_format = "INV-{year}-{seq:04}"  # e.g., INV-2026-0001
currency = "USD"
currency_symbol = "$"
due_days = 30
tax_rate = 0.0  # percent, e.g., 8.25

[plans]
grace_days = 15  # days past due before a payment plan defaults

[affiliates]
commission_rate = 10.0  # percent of each referred registration
minimum_payout = 50.0

[api]
# base_url = "https://league.example.org"
# token = "..."        # or set LEAGUE_API_TOKEN
"#;
