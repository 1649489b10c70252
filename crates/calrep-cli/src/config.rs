//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use calrep_core::ExcludeMode;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Calendar to read (`primary` or a calendar id).
    pub calendar_id: String,
    /// OAuth2 token file holding `access_token`.
    pub token_path: PathBuf,
    /// Root of the Calendar v3 API.
    pub api_base_url: String,
    /// Keywords excluded when none are given on the command line.
    pub exclude_keywords: Vec<String>,
    /// Match mode for exclusion keywords.
    pub exclude_mode: ExcludeMode,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("calendar_id", &self.calendar_id)
            .field("token_path", &self.token_path)
            .field("api_base_url", &self.api_base_url)
            .field("exclude_keywords", &self.exclude_keywords.len())
            .field("exclude_mode", &self.exclude_mode)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            calendar_id: "primary".to_string(),
            token_path: data_dir.join("tokens.json"),
            api_base_url: calrep_gcal::DEFAULT_API_BASE.to_string(),
            exclude_keywords: Vec::new(),
            exclude_mode: ExcludeMode::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CALREP_*)
        figment = figment.merge(Env::prefixed("CALREP_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for calrep.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("calrep"))
}

/// Returns the platform-specific data directory for calrep.
///
/// On Linux: `~/.local/share/calrep`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("calrep"))
}
