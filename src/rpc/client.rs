//! JSON-RPC client for Bitcoin-Core-compatible nodes

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CallArgs, CommandInterface, Hash256, Reply, RpcError, reference};

/// Credentials presented to the node
#[derive(Debug, Clone, Default)]
pub enum NodeAuth {
    /// No authentication header
    #[default]
    None,
    /// `rpcuser` / `rpcpassword`
    UserPass { user: String, password: SecretString },
    /// Cookie file written by the node (`user:password`), re-read per request
    CookieFile(PathBuf),
}

/// Client for a node's JSON-RPC interface
#[derive(Debug)]
pub struct NodeClient {
    /// HTTP client
    client: Client,
    /// RPC endpoint URL
    url: String,
    auth: NodeAuth,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl NodeClient {
    /// Create a client for the node at `url`
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Transport` if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, auth: NodeAuth, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            auth,
            next_id: AtomicU64::new(1),
        })
    }

    /// Node URL this client talks to
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn credentials(&self) -> Result<Option<(String, String)>, RpcError> {
        match &self.auth {
            NodeAuth::None => Ok(None),
            NodeAuth::UserPass { user, password } => {
                Ok(Some((user.clone(), password.expose_secret().to_string())))
            }
            NodeAuth::CookieFile(path) => {
                let cookie = tokio::fs::read_to_string(path).await.map_err(|e| {
                    RpcError::Credentials(format!("cannot read cookie file {}: {e}", path.display()))
                })?;
                let (user, password) = cookie.trim().split_once(':').ok_or_else(|| {
                    RpcError::Credentials(format!("cookie file {} is malformed", path.display()))
                })?;
                Ok(Some((user.to_string(), password.to_string())))
            }
        }
    }

    /// Send one JSON-RPC request and return its `result`
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unreachable, rejects the command,
    /// or answers with something that is not a JSON-RPC response
    pub async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "1.0",
            id,
            method,
            params,
        };

        let mut req = self.client.post(&self.url).json(&body);
        if let Some((user, password)) = self.credentials().await? {
            req = req.basic_auth(user, Some(password));
        }

        tracing::trace!(id, method, "sending rpc request");
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<RpcResponse>(&text) {
            Ok(RpcResponse {
                error: Some(error), ..
            }) => Err(RpcError::Node {
                code: error.code,
                message: error.message,
            }),
            _ if !status.is_success() => Err(RpcError::Http {
                status: status.as_u16(),
                body: text,
            }),
            Ok(parsed) => Ok(parsed.result),
            Err(e) => Err(RpcError::Decode(format!("{method}: {e}"))),
        }
    }

    /// Hash of the chain tip
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the hash is malformed
    pub async fn get_best_block_hash(&self) -> Result<Hash256, RpcError> {
        let result = self.request("getbestblockhash", Vec::new()).await?;
        Hash256::from_display_hex(expect_str(&result, "getbestblockhash")?)
    }

    /// Serialized block bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the block hex is malformed
    pub async fn get_block(&self, hash: &Hash256) -> Result<Vec<u8>, RpcError> {
        let params = vec![Value::String(hash.to_display_hex()), Value::Bool(false)];
        let result = self.request("getblock", params).await?;
        decode_hex(expect_str(&result, "getblock")?)
    }

    /// Number of blocks in the best chain
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the count is not a number
    pub async fn get_block_count(&self) -> Result<u64, RpcError> {
        let result = self.request("getblockcount", Vec::new()).await?;
        result
            .as_u64()
            .ok_or_else(|| RpcError::Decode(format!("getblockcount: expected integer, got {result}")))
    }

    /// Hash of the block at `height` in the best chain
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the height is out of range
    pub async fn get_block_hash(&self, height: i64) -> Result<Hash256, RpcError> {
        let result = self.request("getblockhash", vec![Value::from(height)]).await?;
        Hash256::from_display_hex(expect_str(&result, "getblockhash")?)
    }

    /// Legacy node status summary
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn get_info(&self) -> Result<Value, RpcError> {
        self.request("getinfo", Vec::new()).await
    }

    /// Transaction by id, either serialized or decoded by the node
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the transaction hex is malformed
    pub async fn get_raw_transaction(&self, txid: &Hash256, verbose: bool) -> Result<Reply, RpcError> {
        let params = vec![
            Value::String(txid.to_display_hex()),
            Value::from(i32::from(verbose)),
        ];
        let result = self.request("getrawtransaction", params).await?;
        if verbose {
            Ok(Reply::Json(result))
        } else {
            decode_hex(expect_str(&result, "getrawtransaction")?).map(Reply::Bytes)
        }
    }
}

#[async_trait]
impl CommandInterface for NodeClient {
    async fn invoke(&self, command: &str, args: &CallArgs) -> Result<Reply, RpcError> {
        let method = reference::method(command)
            .ok_or_else(|| RpcError::UnsupportedCommand(command.to_string()))?;
        (method.invoke)(self, args).await
    }

    async fn call(&self, command: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.request(command, params).await
    }
}

fn expect_str<'a>(value: &'a Value, method: &str) -> Result<&'a str, RpcError> {
    value
        .as_str()
        .ok_or_else(|| RpcError::Decode(format!("{method}: expected string, got {value}")))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, RpcError> {
    hex::decode(s).map_err(|e| RpcError::Decode(format!("invalid hex: {e}")))
}
