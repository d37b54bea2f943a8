//! Value types shared by the node client and the gateway

use std::fmt;

use serde_json::Value;

use super::RpcError;

/// A 32-byte block or transaction hash
///
/// Stored in internal (little-endian) byte order. Parsing and display use
/// the byte-reversed hex that nodes print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// Build a hash from internal-order bytes
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Argument` if the slice is not 32 bytes long
    pub fn from_internal(bytes: &[u8]) -> Result<Self, RpcError> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| RpcError::Argument(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(array))
    }

    /// Parse display-order hex as printed by the node
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Decode` on malformed hex or wrong length
    pub fn from_display_hex(s: &str) -> Result<Self, RpcError> {
        let mut bytes = hex::decode(s).map_err(|e| RpcError::Decode(format!("hash {s}: {e}")))?;
        bytes.reverse();
        Self::from_internal(&bytes).map_err(|_| RpcError::Decode(format!("hash {s}: wrong length")))
    }

    /// Internal-order bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Display-order hex
    #[must_use]
    pub fn to_display_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_hex())
    }
}

/// Typed result of a structured command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A block height or count
    Height(u64),
    Hash(Hash256),
    /// Serialized block or transaction bytes
    Bytes(Vec<u8>),
    /// Anything the node returns as a JSON document
    Json(Value),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Height(n) => write!(f, "{n}"),
            Self::Hash(hash) => write!(f, "{hash}"),
            Self::Bytes(bytes) => f.write_str(&hex::encode(bytes)),
            Self::Json(Value::String(s)) => f.write_str(s),
            Self::Json(value) => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                f.write_str(&pretty)
            }
        }
    }
}
