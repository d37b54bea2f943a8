//! Configuration management for the RPC explorer

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::rpc::NodeAuth;
use crate::{Error, Result};

/// Default node JSON-RPC endpoint (mainnet)
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8332";

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Node connection
    pub rpc: RpcConfig,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Allow-listed commands to leave unexposed
    pub disabled_commands: Vec<String>,
}

/// Node connection configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL
    pub url: String,

    /// RPC user (from `RPC_EXPLORER_RPC_USER` env)
    pub user: Option<String>,

    /// RPC password (from `RPC_EXPLORER_RPC_PASSWORD` env)
    pub password: Option<SecretString>,

    /// Node cookie file, used when no user/password pair is set
    pub cookie_file: Option<PathBuf>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl RpcConfig {
    /// Credentials to present to the node
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if only half of a user/password pair is set
    pub fn auth(&self) -> Result<NodeAuth> {
        match (&self.user, &self.password, &self.cookie_file) {
            (Some(user), Some(password), _) => Ok(NodeAuth::UserPass {
                user: user.clone(),
                password: password.clone(),
            }),
            (Some(_), None, _) | (None, Some(_), _) => Err(Error::Config(
                "rpc user and password must be set together".into(),
            )),
            (None, None, Some(path)) => Ok(NodeAuth::CookieFile(path.clone())),
            (None, None, None) => Ok(NodeAuth::None),
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Global request budget per minute; `None` disables rate limiting
    pub rate_limit_per_minute: Option<u32>,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// An explicit `config_path` must exist and parse; otherwise the standard
    /// path is tried and silently skipped when absent.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file cannot be loaded or values
    /// are invalid
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let fc = match config_path {
            Some(path) => file::load_from(path)?,
            None => file::load_config_file(),
        };
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with environment lookups (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a value is invalid
    pub fn from_sources(
        fc: file::ExplorerConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let url = env("RPC_EXPLORER_RPC_URL")
            .or(fc.rpc.url)
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!("rpc url must be http(s): {url}")));
        }

        let rpc = RpcConfig {
            url,
            user: env("RPC_EXPLORER_RPC_USER").or(fc.rpc.user),
            password: env("RPC_EXPLORER_RPC_PASSWORD")
                .or(fc.rpc.password)
                .map(SecretString::from),
            cookie_file: env("RPC_EXPLORER_RPC_COOKIE_FILE")
                .map(PathBuf::from)
                .or(fc.rpc.cookie_file),
            timeout: Duration::from_secs(fc.rpc.timeout_secs.unwrap_or(30)),
        };

        let port = match env("RPC_EXPLORER_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("invalid RPC_EXPLORER_PORT {raw:?}: {e}")))?,
            None => fc.server.port.unwrap_or(5000),
        };

        let api_server = ApiServerConfig {
            host: env("RPC_EXPLORER_HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            rate_limit_per_minute: fc.server.rate_limit_per_minute.filter(|n| *n > 0),
        };

        Ok(Self {
            rpc,
            api_server,
            disabled_commands: fc.commands.disabled,
        })
    }
}
