//! TOML configuration file loading
//!
//! Supports `~/.config/rpc-explorer/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplorerConfigFile {
    /// Node connection
    #[serde(default)]
    pub rpc: RpcFileConfig,

    /// HTTP server
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Command exposure
    #[serde(default)]
    pub commands: CommandsFileConfig,
}

/// Node connection configuration
#[derive(Debug, Default, Deserialize)]
pub struct RpcFileConfig {
    /// JSON-RPC endpoint (e.g. `http://127.0.0.1:8332`)
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Path to the node's `.cookie` file
    pub cookie_file: Option<PathBuf>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// HTTP server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Global request budget; unset disables rate limiting
    pub rate_limit_per_minute: Option<u32>,
}

/// Command exposure configuration
#[derive(Debug, Default, Deserialize)]
pub struct CommandsFileConfig {
    /// Allow-listed commands to leave unexposed
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ExplorerConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ExplorerConfigFile {
    let Some(path) = config_file_path() else {
        return ExplorerConfigFile::default();
    };

    if !path.exists() {
        return ExplorerConfigFile::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            ExplorerConfigFile::default()
        }
    }
}

/// Load and parse a specific config file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn load_from(path: &Path) -> Result<ExplorerConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/rpc-explorer/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("rpc-explorer").join("config.toml"))
}
