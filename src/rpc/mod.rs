//! Remote command interface
//!
//! The gateway never talks to a node directly. Handlers receive a
//! [`CommandInterface`] and go through one of its two calling conventions:
//! a structured call with named, converted arguments, or the positional
//! fallback that every implementation must support.

mod client;
pub mod reference;
mod types;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::conversion::ParamValue;

pub use client::{NodeAuth, NodeClient};
pub use types::{Hash256, Reply};

/// Errors raised by a remote command interface
#[derive(Debug, Error)]
pub enum RpcError {
    /// The node could not be reached
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a non-success HTTP status and no RPC error body
    #[error("node returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The node rejected the command
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },

    /// Node credentials could not be loaded
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The node's answer could not be interpreted
    #[error("malformed response: {0}")]
    Decode(String),

    /// A structured argument is missing or has the wrong type
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The interface has no structured form of this command
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),
}

/// Named arguments for a structured call, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    values: Vec<(String, ParamValue)>,
}

impl CallArgs {
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Append a named value
    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.push((name.into(), value));
    }

    /// Builder form of [`CallArgs::push`]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.push(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Required hash argument
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Argument` if absent or not 32 bytes
    pub fn hash(&self, name: &str) -> Result<Hash256, RpcError> {
        match self.get(name) {
            Some(ParamValue::Bytes(bytes)) => Hash256::from_internal(bytes)
                .map_err(|e| RpcError::Argument(format!("`{name}`: {e}"))),
            other => Err(Self::mismatch(name, "a 32-byte hash", other)),
        }
    }

    /// Required integer argument
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Argument` if absent or not an integer
    pub fn int(&self, name: &str) -> Result<i64, RpcError> {
        match self.get(name) {
            Some(ParamValue::Int(n)) => Ok(*n),
            other => Err(Self::mismatch(name, "an integer", other)),
        }
    }

    /// Boolean argument, `false` when absent or null
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Argument` if present with another type
    pub fn flag(&self, name: &str) -> Result<bool, RpcError> {
        match self.get(name) {
            Some(ParamValue::Bool(b)) => Ok(*b),
            None | Some(ParamValue::Null) => Ok(false),
            other => Err(Self::mismatch(name, "a boolean", other)),
        }
    }

    fn mismatch(name: &str, expected: &str, found: Option<&ParamValue>) -> RpcError {
        match found {
            None | Some(ParamValue::Null) => {
                RpcError::Argument(format!("`{name}` is required"))
            }
            Some(value) => RpcError::Argument(format!("`{name}` must be {expected}, got {value}")),
        }
    }
}

/// Per-request handle to the node's command interface
#[async_trait]
pub trait CommandInterface: Send + Sync {
    /// Structured call of a declared command with converted named arguments
    async fn invoke(&self, command: &str, args: &CallArgs) -> Result<Reply, RpcError>;

    /// Generic call by name with positional arguments
    async fn call(&self, command: &str, params: Vec<Value>) -> Result<Value, RpcError>;

    /// Current chain height as reported by `getblockcount`
    async fn block_count(&self) -> Result<u64, RpcError> {
        match self.invoke("getblockcount", &CallArgs::new()).await? {
            Reply::Height(n) => Ok(n),
            other => Err(RpcError::Decode(format!("getblockcount returned {other:?}"))),
        }
    }

    /// Hash of the block at `height`
    async fn block_hash(&self, height: u64) -> Result<Hash256, RpcError> {
        let height = i64::try_from(height)
            .map_err(|_| RpcError::Argument(format!("height {height} out of range")))?;
        let args = CallArgs::new().with("height", ParamValue::Int(height));
        match self.invoke("getblockhash", &args).await? {
            Reply::Hash(hash) => Ok(hash),
            other => Err(RpcError::Decode(format!("getblockhash returned {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_args_keep_declaration_order() {
        let args = CallArgs::new()
            .with("txid", ParamValue::Null)
            .with("verbose", ParamValue::Bool(true));
        let names: Vec<&str> = args.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["txid", "verbose"]);
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn missing_hash_is_an_argument_error() {
        let args = CallArgs::new().with("block_hash", ParamValue::Null);
        let err = args.hash("block_hash").unwrap_err();
        assert!(matches!(err, RpcError::Argument(ref m) if m.contains("required")));
    }

    #[test]
    fn flag_defaults_to_false() {
        let args = CallArgs::new();
        assert!(!args.flag("verbose").unwrap());
        let args = CallArgs::new().with("verbose", ParamValue::Text("yes".into()));
        assert!(args.flag("verbose").is_err());
    }

    #[test]
    fn int_reads_converted_heights() {
        let args = CallArgs::new().with("height", ParamValue::Int(9));
        assert_eq!(args.int("height").unwrap(), 9);
    }
}
