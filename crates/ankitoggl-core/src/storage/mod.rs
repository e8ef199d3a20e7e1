mod config;
mod ledger;

pub use config::{mask_token, Config, ConfigError};
pub use ledger::{SyncAction, SyncKey, SyncLedger, SyncRecord};

use std::path::PathBuf;

/// Returns `~/.config/ankitoggl[-dev]/` based on ANKITOGGL_ENV.
///
/// Set ANKITOGGL_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ANKITOGGL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ankitoggl-dev")
    } else {
        base_dir.join("ankitoggl")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
