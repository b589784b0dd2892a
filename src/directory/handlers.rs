use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use super::protocol::*;
use super::service::DirectoryService;
use super::types::{ReadPlan, WritePlan};
use crate::protocol::{ApiError, ENDPOINT_HEALTH, HealthResponse};

/// HTTP surface of a directory service.
pub fn router(service: Arc<DirectoryService>) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_WRITE_PLAN, post(handle_write_plan))
        .route(ENDPOINT_COMMIT_WRITE, post(handle_commit_write))
        .route(ENDPOINT_READ_PLAN, get(handle_read_plan))
        .route(ENDPOINT_LIST_FILES, get(handle_list_files))
        .route(ENDPOINT_LIST_NODES, get(handle_list_nodes))
        .layer(Extension(service))
}

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("directory", None))
}

pub async fn handle_write_plan(
    Extension(service): Extension<Arc<DirectoryService>>,
    Json(req): Json<WritePlanRequest>,
) -> Result<Json<WritePlan>, ApiError> {
    match service.get_write_plan(&req.file_name, req.total_size) {
        Ok(plan) => Ok(Json(plan)),
        Err(e) => {
            tracing::warn!("Rejected write plan for '{}': {}", req.file_name, e);
            Err(e.to_reply())
        }
    }
}

pub async fn handle_commit_write(
    Extension(service): Extension<Arc<DirectoryService>>,
    Json(req): Json<CommitRequest>,
) -> Result<(StatusCode, Json<CommitResponse>), ApiError> {
    let block_count = req.blocks.len();
    match service.commit_write(&req.file_name, req.blocks, req.total_size) {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(CommitResponse {
                file_name: req.file_name,
                block_count,
            }),
        )),
        Err(e) => {
            tracing::error!("Failed to commit '{}': {}", req.file_name, e);
            Err(e.to_reply())
        }
    }
}

pub async fn handle_read_plan(
    Extension(service): Extension<Arc<DirectoryService>>,
    Query(params): Query<ReadPlanParams>,
) -> Result<Json<ReadPlan>, ApiError> {
    service
        .get_read_plan(&params.file_name)
        .map(Json)
        .map_err(|e| {
            tracing::debug!("Read plan failed: {}", e);
            e.to_reply()
        })
}

pub async fn handle_list_files(
    Extension(service): Extension<Arc<DirectoryService>>,
) -> Json<FileListResponse> {
    Json(FileListResponse {
        files: service.list_files(),
    })
}

pub async fn handle_list_nodes(
    Extension(service): Extension<Arc<DirectoryService>>,
) -> Json<NodeListResponse> {
    Json(NodeListResponse {
        nodes: service.nodes().to_vec(),
    })
}
