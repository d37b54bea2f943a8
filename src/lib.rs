//! RPC Explorer - HTTP gateway for a Bitcoin node's read-only commands
//!
//! Each allow-listed node command becomes a `GET /{command}` endpoint whose
//! query parameters are the command's declared arguments. Endpoints are not
//! written by hand: they are synthesized at startup from a catalog built out
//! of the reference client's declared signatures.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    HTTP (axum)                       │
//! │   GET /{command}?param=value   │   GET /  (blocks)  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │          Catalog  →  Endpoint synthesizer            │
//! │   allow-list │ signatures │ defaults │ conversions   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │        CommandInterface (JSON-RPC node client)       │
//! │   structured invoke   │   positional fallback call  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod conversion;
pub mod error;
pub mod rpc;

pub use api::{ApiError, ApiServer, ApiServerBuilder, GatewayState};
pub use catalog::{Catalog, OperationDescriptor, ParameterSpec};
pub use config::Config;
pub use conversion::{ConversionError, ParamValue};
pub use error::{Error, Result};
pub use rpc::{CallArgs, CommandInterface, Hash256, NodeAuth, NodeClient, Reply, RpcError};
