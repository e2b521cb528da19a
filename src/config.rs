//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::Result;
use crate::error::Error;

/// Environment variable overriding the configured client id
pub const CLIENT_ID_ENV: &str = "MONZO_CLIENT_ID";

/// Environment variable overriding the configured client secret
pub const CLIENT_SECRET_ENV: &str = "MONZO_CLIENT_SECRET";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth client id from the Monzo developer portal
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret from the Monzo developer portal
    #[serde(default)]
    pub client_secret: String,

    /// Redirect URI registered with the OAuth client
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Base URL of the Monzo API (token endpoint and data endpoints)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the browser-facing authorization page
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Port of the local redirect listener
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
}

fn default_callback_port() -> u16 {
    8085
}

fn default_redirect_uri() -> String {
    format!("http://127.0.0.1:{}/callback", default_callback_port())
}

fn default_api_url() -> String {
    "https://api.monzo.com/".to_string()
}

fn default_auth_url() -> String {
    "https://auth.monzo.com/".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            callback_port: default_callback_port(),
        }
    }
}

impl Config {
    /// Apply `MONZO_CLIENT_ID` / `MONZO_CLIENT_SECRET` when set and non-empty
    pub fn apply_env(&mut self) {
        if let Ok(id) = std::env::var(CLIENT_ID_ENV) {
            if !id.is_empty() {
                self.client_id = id;
            }
        }
        if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
            if !secret.is_empty() {
                self.client_secret = secret;
            }
        }
    }

    /// Check that the OAuth client credentials are present
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config(
                "client_id is not set. Run 'monzo-widget setup' first.".to_string(),
            ));
        }
        if self.client_secret.trim().is_empty() {
            return Err(Error::Config(
                "client_secret is not set. Run 'monzo-widget setup' first.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".monzo-widget")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load configuration from file, then apply environment overrides
pub fn load() -> Result<Config> {
    let path = config_path();

    let mut config = if path.exists() {
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)?
    } else {
        Config::default()
    };

    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Save configuration to file
pub fn save(config: &Config) -> Result<()> {
    let path = config_path();

    // Create parent directory
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, content)?;

    // The file holds the client secret
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Interactively collect OAuth client credentials and save them
pub fn setup() -> Result<Config> {
    use crate::ui;
    use inquire::{Password, PasswordDisplayMode, Text};

    ui::print_header("Client setup");
    ui::print_step("Create an OAuth client at https://developers.monzo.com");

    let mut config = Config::default();
    ui::print_step(&format!("Use {} as the redirect URL", config.redirect_uri));
    println!();

    let client_id = Text::new("Client ID:").prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;
    let client_secret = Password::new("Client secret:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;

    config.client_id = client_id.trim().to_string();
    config.client_secret = client_secret.trim().to_string();
    config.validate()?;

    ui::print_thinking("Saving configuration");
    save(&config)?;
    ui::print_success("Setup complete! Run 'monzo-widget login' next.");

    Ok(config)
}
