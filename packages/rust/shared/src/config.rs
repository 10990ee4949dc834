//! Application configuration for AwesomeHub.
//!
//! User config lives at `~/.awesomehub/awesomehub.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "awesomehub.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".awesomehub";

// ---------------------------------------------------------------------------
// Config structs (matching awesomehub.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Entry resolution settings.
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[resolve]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Bypass the resolver cache.
    #[serde(default)]
    pub force: bool,

    /// Directory holding cached resolver records.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Seconds before a cached record goes stale (0 = never).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Attributes an entry must carry to resolve successfully.
    #[serde(default = "default_required_attributes")]
    pub required_attributes: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            force: false,
            cache_dir: default_cache_dir(),
            cache_ttl_secs: default_cache_ttl(),
            required_attributes: default_required_attributes(),
        }
    }
}

fn default_cache_dir() -> String {
    "~/.awesomehub/cache".into()
}
fn default_cache_ttl() -> u64 {
    86_400
}
fn default_required_attributes() -> Vec<String> {
    vec!["url".into()]
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the finalized list JSON is written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Pretty-print the output JSON.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            pretty: true,
        }
    }
}

fn default_output_dir() -> String {
    "dist".into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.awesomehub/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| HubError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.awesomehub/awesomehub.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HubError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| HubError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HubError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| HubError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HubError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| HubError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
