//! Shared test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rpc_explorer::api::{self, GatewayState};
use rpc_explorer::catalog::{self, Catalog};
use rpc_explorer::rpc::reference::ReferenceClient;
use rpc_explorer::{CallArgs, CommandInterface, Hash256, Reply, RpcError};
use serde_json::{Value, json};

/// In-memory node that records every call it receives
#[derive(Default)]
pub struct StubNode {
    pub height: u64,
    invocations: Mutex<Vec<(String, CallArgs)>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    failing: AtomicBool,
}

impl StubNode {
    #[must_use]
    pub fn with_height(height: u64) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    /// Make every following call fail until cleared
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Structured calls received so far
    pub fn invocations(&self) -> Vec<(String, CallArgs)> {
        self.invocations.lock().expect("lock poisoned").clone()
    }

    /// Positional fallback calls received so far
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Hash the stub reports for `height`
    #[must_use]
    pub fn hash_at(height: u64) -> Hash256 {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&height.to_le_bytes());
        Hash256::from_internal(&bytes).expect("32 bytes")
    }

    fn check_failing(&self) -> Result<(), RpcError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RpcError::Node {
                code: -28,
                message: "Loading block index...".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CommandInterface for StubNode {
    async fn invoke(&self, command: &str, args: &CallArgs) -> Result<Reply, RpcError> {
        self.invocations
            .lock()
            .expect("lock poisoned")
            .push((command.to_string(), args.clone()));
        self.check_failing()?;

        match command {
            "getblockcount" => Ok(Reply::Height(self.height)),
            "getblockhash" => {
                let height = u64::try_from(args.int("height")?)
                    .map_err(|_| RpcError::Argument("negative height".into()))?;
                Ok(Reply::Hash(Self::hash_at(height)))
            }
            "getrawtransaction" => {
                let txid = args.hash("txid")?;
                let verbose = args.flag("verbose")?;
                Ok(Reply::Json(json!({ "txid": txid.to_string(), "verbose": verbose })))
            }
            other => Ok(Reply::Json(Value::String(format!("{other} ok")))),
        }
    }

    async fn call(&self, command: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push((command.to_string(), params.clone()));
        self.check_failing()?;

        Ok(json!({ "command": command, "params": params }))
    }
}

/// Catalog of the full allow-list against the reference client
#[must_use]
pub fn reference_catalog(disabled: &[String]) -> Catalog {
    let permitted = catalog::permitted_commands(disabled);
    Catalog::build(&permitted, &ReferenceClient).expect("reference catalog builds")
}

/// Build a test router around `node`
pub fn build_test_router(node: Arc<StubNode>, disabled: &[String]) -> axum::Router {
    let state = GatewayState::new(node, reference_catalog(disabled));
    api::router(Arc::new(state))
}
