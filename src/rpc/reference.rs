//! Declared methods of the reference node client
//!
//! This table is the single source of truth for structured commands: the
//! catalog reads each entry's parameters and defaults, and
//! [`NodeClient`](super::NodeClient) dispatches structured calls through the
//! entry's invoker. Declaring a method here does not expose it; only names on
//! the allow-list become endpoints.

use futures::future::BoxFuture;
use serde_json::Value;

use super::{CallArgs, NodeClient, Reply, RpcError};
use crate::catalog::{DeclaredSignature, Literal, SignatureSource};

/// Typed call of one declared method
pub type Invoker =
    for<'a> fn(&'a NodeClient, &'a CallArgs) -> BoxFuture<'a, Result<Reply, RpcError>>;

/// One declared method of the reference client
pub struct Method {
    pub name: &'static str,
    /// Formal parameters, receiver first
    pub params: &'static [&'static str],
    /// Defaults for the trailing parameters
    pub defaults: &'static [Literal],
    pub invoke: Invoker,
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

pub static METHODS: &[Method] = &[
    Method {
        name: "getbestblockhash",
        params: &["self"],
        defaults: &[],
        invoke: get_best_block_hash,
    },
    Method {
        name: "getblock",
        params: &["self", "block_hash"],
        defaults: &[],
        invoke: get_block,
    },
    Method {
        name: "getblockcount",
        params: &["self"],
        defaults: &[],
        invoke: get_block_count,
    },
    Method {
        name: "getblockhash",
        params: &["self", "height"],
        defaults: &[],
        invoke: get_block_hash,
    },
    Method {
        name: "getblockheader",
        params: &["self", "block_hash", "verbose"],
        defaults: &[Literal::Bool(false)],
        invoke: get_block_header,
    },
    Method {
        name: "getinfo",
        params: &["self"],
        defaults: &[],
        invoke: get_info,
    },
    Method {
        name: "getnewaddress",
        params: &["self", "account"],
        defaults: &[Literal::Null],
        invoke: get_new_address,
    },
    Method {
        name: "getrawmempool",
        params: &["self", "verbose"],
        defaults: &[Literal::Bool(false)],
        invoke: get_raw_mempool,
    },
    Method {
        name: "getrawtransaction",
        params: &["self", "txid", "verbose"],
        defaults: &[Literal::Bool(false)],
        invoke: get_raw_transaction,
    },
    Method {
        name: "gettxout",
        params: &["self", "outpoint", "includemempool"],
        defaults: &[Literal::Bool(true)],
        invoke: get_tx_out,
    },
    Method {
        name: "sendrawtransaction",
        params: &["self", "tx", "allowhighfees"],
        defaults: &[Literal::Bool(false)],
        invoke: send_raw_transaction,
    },
    Method {
        name: "validateaddress",
        params: &["self", "address"],
        defaults: &[],
        invoke: validate_address,
    },
];

/// Look up a declared method by name
#[must_use]
pub fn method(name: &str) -> Option<&'static Method> {
    METHODS.iter().find(|m| m.name == name)
}

/// [`SignatureSource`] backed by [`METHODS`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceClient;

impl SignatureSource for ReferenceClient {
    fn signature(&self, name: &str) -> Option<DeclaredSignature<'_>> {
        method(name).map(|m| DeclaredSignature {
            params: m.params,
            defaults: m.defaults,
        })
    }
}

fn get_best_block_hash<'a>(
    client: &'a NodeClient,
    _args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    Box::pin(async move { client.get_best_block_hash().await.map(Reply::Hash) })
}

fn get_block<'a>(client: &'a NodeClient, args: &'a CallArgs) -> BoxFuture<'a, Result<Reply, RpcError>> {
    Box::pin(async move {
        let hash = args.hash("block_hash")?;
        client.get_block(&hash).await.map(Reply::Bytes)
    })
}

fn get_block_count<'a>(
    client: &'a NodeClient,
    _args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    Box::pin(async move { client.get_block_count().await.map(Reply::Height) })
}

fn get_block_hash<'a>(client: &'a NodeClient, args: &'a CallArgs) -> BoxFuture<'a, Result<Reply, RpcError>> {
    Box::pin(async move {
        let height = args.int("height")?;
        client.get_block_hash(height).await.map(Reply::Hash)
    })
}

fn get_block_header<'a>(
    client: &'a NodeClient,
    args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    Box::pin(async move {
        let hash = args.hash("block_hash")?;
        let verbose = args.flag("verbose")?;
        let params = vec![Value::String(hash.to_display_hex()), Value::Bool(verbose)];
        client.request("getblockheader", params).await.map(Reply::Json)
    })
}

fn get_info<'a>(client: &'a NodeClient, _args: &'a CallArgs) -> BoxFuture<'a, Result<Reply, RpcError>> {
    Box::pin(async move { client.get_info().await.map(Reply::Json) })
}

fn get_raw_transaction<'a>(
    client: &'a NodeClient,
    args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    Box::pin(async move {
        let txid = args.hash("txid")?;
        let verbose = args.flag("verbose")?;
        client.get_raw_transaction(&txid, verbose).await
    })
}

fn get_new_address<'a>(
    client: &'a NodeClient,
    args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    positional(client, "getnewaddress", args)
}

fn get_raw_mempool<'a>(
    client: &'a NodeClient,
    args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    positional(client, "getrawmempool", args)
}

fn get_tx_out<'a>(client: &'a NodeClient, args: &'a CallArgs) -> BoxFuture<'a, Result<Reply, RpcError>> {
    positional(client, "gettxout", args)
}

fn send_raw_transaction<'a>(
    client: &'a NodeClient,
    args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    positional(client, "sendrawtransaction", args)
}

fn validate_address<'a>(
    client: &'a NodeClient,
    args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    positional(client, "validateaddress", args)
}

/// Forward the arguments positionally and return the node's JSON as is
fn positional<'a>(
    client: &'a NodeClient,
    method: &'static str,
    args: &'a CallArgs,
) -> BoxFuture<'a, Result<Reply, RpcError>> {
    Box::pin(async move {
        let params = args.iter().map(|(_, value)| value.to_json()).collect();
        client.request(method, params).await.map(Reply::Json)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ALLOWED_COMMANDS, RECEIVER};

    #[test]
    fn every_method_takes_the_receiver_first() {
        for m in METHODS {
            assert_eq!(m.params.first(), Some(&RECEIVER), "{}", m.name);
            assert!(m.defaults.len() < m.params.len(), "{}", m.name);
        }
    }

    #[test]
    fn names_are_unique() {
        for (i, m) in METHODS.iter().enumerate() {
            assert!(METHODS[i + 1..].iter().all(|other| other.name != m.name));
        }
    }

    #[test]
    fn some_declared_methods_stay_unexposed() {
        let hidden: Vec<&str> = METHODS
            .iter()
            .map(|m| m.name)
            .filter(|name| !ALLOWED_COMMANDS.contains(name))
            .collect();
        assert!(hidden.contains(&"sendrawtransaction"));
        assert!(hidden.contains(&"validateaddress"));
    }

    #[test]
    fn signature_source_reports_declared_methods() {
        let sig = ReferenceClient.signature("getrawtransaction").unwrap();
        assert_eq!(sig.params, ["self", "txid", "verbose"]);
        assert_eq!(sig.defaults, [Literal::Bool(false)]);
        assert!(ReferenceClient.signature("getpeerinfo").is_none());
    }
}
