//! Configuration management subcommand.

use clap::Subcommand;

use ankitoggl_core::storage::mask_token;
use ankitoggl_core::{Config, Timezone, TogglClient};

/// Configuration actions.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration (token masked)
    Show,
    /// Set a configuration value
    Set { key: String, value: String },
    /// Verify the configured credentials against the Toggl API
    Test,
    /// Reset the configuration to defaults
    Reset,
}

/// Run the config command.
pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => show(),
        ConfigAction::Set { key, value } => set(&key, &value),
        ConfigAction::Test => test(),
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("Configuration reset to defaults.");
            Ok(())
        }
    }
}

fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    println!("api_token       = {}", mask_token(&config.api_token));
    println!("workspace_id    = {}", config.workspace_id);
    println!("project_id      = {}", config.project_id);
    println!("description     = {}", config.description);
    println!("timezone        = {}", config.timezone);
    println!("collection_path = {}", config.collection_path);
    Ok(())
}

fn set(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    match key {
        "api_token" => config.api_token = value.to_string(),
        "workspace_id" => config.workspace_id = value.parse()?,
        "project_id" => config.project_id = value.parse()?,
        "description" => config.description = value.to_string(),
        "timezone" => {
            Timezone::new(value)?;
            config.timezone = value.to_string();
        }
        "collection_path" => config.collection_path = value.to_string(),
        _ => {
            return Err(format!(
                "unknown config key: {key}. Valid keys: api_token, workspace_id, \
                 project_id, description, timezone, collection_path"
            )
            .into());
        }
    }
    config.save()?;
    println!("Set {key}.");
    Ok(())
}

fn test() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.validate()?;
    let client = TogglClient::new(&config.api_token, config.entry_spec())?;
    let response = client.me()?;
    let name = response
        .json()
        .and_then(|v| v["fullname"].as_str().map(String::from))
        .unwrap_or_else(|| "unknown user".to_string());
    println!("Credentials OK ({name}).");
    Ok(())
}
