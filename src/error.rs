//! Error types for the RPC explorer gateway

use thiserror::Error;

use crate::rpc::RpcError;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or starting the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Catalog could not be built from the allow-list
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Remote command interface error
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
