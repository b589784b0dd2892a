use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Extension, Path};
use axum::http::{StatusCode, header};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use super::node::StorageNode;
use super::protocol::*;
use crate::block::types::BlockId;
use crate::protocol::{ApiError, ENDPOINT_HEALTH, HealthResponse};

/// HTTP surface of a storage node.
///
/// The body limit is lifted: block size is a cluster policy enforced by whoever cuts the
/// blocks, not by the node.
pub fn router(node: Arc<StorageNode>) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_BLOCKS, get(handle_list_blocks))
        .route(
            &format!("{}/:block_id", ENDPOINT_BLOCKS),
            get(handle_read_block).put(handle_write_block),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(Extension(node))
}

pub async fn handle_health(
    Extension(node): Extension<Arc<StorageNode>>,
) -> Json<HealthResponse> {
    Json(HealthResponse::healthy("storage_node", Some(node.id.clone())))
}

pub async fn handle_write_block(
    Extension(node): Extension<Arc<StorageNode>>,
    Path(block_id): Path<String>,
    payload: Bytes,
) -> Result<(StatusCode, Json<StoreBlockResponse>), ApiError> {
    let block_id = BlockId(block_id);

    match node.write_block(&block_id, payload).await {
        Ok(size) => Ok((
            StatusCode::CREATED,
            Json(StoreBlockResponse { block_id, size }),
        )),
        Err(e) => {
            tracing::error!("[{}] Failed to store block {}: {}", node.id, block_id, e);
            Err(e.to_reply())
        }
    }
}

pub async fn handle_read_block(
    Extension(node): Extension<Arc<StorageNode>>,
    Path(block_id): Path<String>,
) -> Result<([(header::HeaderName, &'static str); 1], Bytes), ApiError> {
    let block_id = BlockId(block_id);

    match node.read_block(&block_id).await {
        Ok(payload) => Ok(([(header::CONTENT_TYPE, OCTET_STREAM)], payload)),
        Err(e) => {
            tracing::warn!("[{}] Failed to serve block {}: {}", node.id, block_id, e);
            Err(e.to_reply())
        }
    }
}

pub async fn handle_list_blocks(
    Extension(node): Extension<Arc<StorageNode>>,
) -> Result<Json<BlockListResponse>, ApiError> {
    let blocks = node.list_blocks().await.map_err(|e| e.to_reply())?;
    Ok(Json(BlockListResponse {
        node_id: node.id.clone(),
        blocks,
    }))
}
