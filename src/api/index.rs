//! Block list page served at `/`

use std::sync::Arc;

use askama::Template;
use axum::{extract::State, response::Html};

use super::{ApiError, GatewayState};
use crate::rpc::{CommandInterface, RpcError};

/// One row of the block list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    pub height: u64,
    pub hash: String,
}

#[derive(Template)]
#[template(path = "blocks.html")]
struct BlocksPage<'a> {
    blocks: &'a [BlockRow],
}

/// Every block from height 0 up to the current count, in order
///
/// Issues one `getblockhash` per height.
///
/// # Errors
///
/// Returns the first `RpcError` raised by the node
pub async fn list_blocks(rpc: &dyn CommandInterface) -> Result<Vec<BlockRow>, RpcError> {
    let count = rpc.block_count().await?;
    tracing::debug!(count, "listing blocks");

    let mut blocks = Vec::new();
    for height in 0..count {
        let hash = rpc.block_hash(height).await?;
        blocks.push(BlockRow {
            height,
            hash: hash.to_string(),
        });
    }
    Ok(blocks)
}

/// Render the block list page
///
/// # Errors
///
/// Returns `ApiError::Render` if the template fails
pub fn render_blocks(blocks: &[BlockRow]) -> Result<String, ApiError> {
    BlocksPage { blocks }
        .render()
        .map_err(|e| ApiError::Render(e.to_string()))
}

pub(super) async fn index(State(state): State<Arc<GatewayState>>) -> Result<Html<String>, ApiError> {
    let blocks = list_blocks(state.rpc.as_ref()).await.map_err(|e| {
        tracing::warn!(error = %e, "block listing failed");
        ApiError::from(e)
    })?;
    render_blocks(&blocks).map(Html)
}
