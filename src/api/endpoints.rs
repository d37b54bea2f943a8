//! Endpoint synthesis
//!
//! One GET route per cataloged command at `/{command}`. Every route runs the
//! same handler, parameterised by the command's descriptor: query values or
//! cataloged defaults are resolved in declaration order, then either
//! converted and passed to a structured call, or forwarded raw through the
//! positional fallback.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde_json::Value;

use super::{ApiError, GatewayState};
use crate::catalog::{Catalog, OperationDescriptor};
use crate::conversion::{self, ParamValue};
use crate::rpc::{CallArgs, CommandInterface, Reply};

/// Commands whose structured reply is not usefully printable; always served
/// through the positional fallback
pub const FALLBACK_ONLY: &[&str] = &["getblock"];

/// Trailing positional flag requesting the node's verbose/JSON form
pub const FALLBACK_MODE_FLAG: bool = true;

/// URL path for a command
#[must_use]
pub fn endpoint_path(command: &str) -> String {
    format!("/{command}")
}

/// Register one route per descriptor in `catalog`
pub fn router(catalog: &Catalog) -> Router<Arc<GatewayState>> {
    let mut router = Router::new();

    for descriptor in catalog.iter() {
        let path = endpoint_path(&descriptor.name);
        let descriptor = Arc::new(descriptor.clone());

        router = router.route(
            &path,
            get(
                move |State(state): State<Arc<GatewayState>>,
                      Query(query): Query<HashMap<String, String>>| {
                    let descriptor = descriptor.clone();
                    async move { handle(state.rpc.as_ref(), &descriptor, &query).await }
                },
            ),
        );
        tracing::debug!(path = %path, "registered endpoint");
    }

    router
}

/// Whether a descriptor is served by a structured call
#[must_use]
pub fn uses_structured_call(descriptor: &OperationDescriptor) -> bool {
    descriptor.has_cataloged_signature && !FALLBACK_ONLY.contains(&descriptor.name.as_str())
}

/// Request value for each parameter, or its cataloged default
#[must_use]
pub fn resolve(
    descriptor: &OperationDescriptor,
    query: &HashMap<String, String>,
) -> Vec<(String, ParamValue)> {
    descriptor
        .params
        .iter()
        .map(|param| {
            let value = query
                .get(&param.name)
                .map_or_else(|| param.default_value(), |v| ParamValue::Text(v.clone()));
            (param.name.clone(), value)
        })
        .collect()
}

/// Serve one request for `descriptor`
///
/// # Errors
///
/// Returns `ApiError::Conversion` for malformed values, and the mapped
/// `RpcError` when the node call fails
pub async fn handle(
    rpc: &dyn CommandInterface,
    descriptor: &OperationDescriptor,
    query: &HashMap<String, String>,
) -> Result<String, ApiError> {
    let command = descriptor.name.as_str();
    let resolved = resolve(descriptor, query);

    let outcome = if uses_structured_call(descriptor) {
        let mut args = CallArgs::new();
        for (name, value) in resolved {
            let value = conversion::convert(&name, value)?;
            args.push(name, value);
        }

        tracing::debug!(command, "structured call");
        rpc.invoke(command, &args).await
    } else {
        let mut params: Vec<Value> = resolved.iter().map(|(_, value)| value.to_json()).collect();
        params.push(Value::Bool(FALLBACK_MODE_FLAG));

        tracing::debug!(command, params = params.len(), "fallback call");
        rpc.call(command, params).await.map(Reply::Json)
    };

    match outcome {
        Ok(reply) => Ok(reply.to_string()),
        Err(e) => {
            tracing::warn!(command, error = %e, "command failed");
            Err(e.into())
        }
    }
}
