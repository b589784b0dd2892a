use bytes::Bytes;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::time::Duration;

use crate::block::types::{BlockId, NodeEntry};
use crate::directory::protocol::*;
use crate::directory::types::{ReadPlan, WritePlan};
use crate::error::{ClusterError, ClusterResult};
use crate::protocol::{ENDPOINT_HEALTH, ErrorResponse, HealthResponse};
use crate::storage::protocol::{ENDPOINT_BLOCKS, OCTET_STREAM, StoreBlockResponse};

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared HTTP client. `timeout` bounds every request; a stalled transfer surfaces as
/// `NodeUnreachable`.
pub fn http_client(timeout: Duration) -> ClusterResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .build()
        .map_err(|e| ClusterError::InvalidRequest(format!("cannot build HTTP client: {}", e)))
}

/// Typed client of the directory service.
#[derive(Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    addr: SocketAddr,
}

impl DirectoryClient {
    pub fn new(http: reqwest::Client, addr: SocketAddr) -> Self {
        Self { http, addr }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("http://{}{}", self.addr, endpoint)
    }

    pub async fn get_write_plan(&self, file_name: &str, total_size: u64) -> ClusterResult<WritePlan> {
        let request = self
            .http
            .post(self.url(ENDPOINT_WRITE_PLAN))
            .json(&WritePlanRequest {
                file_name: file_name.to_string(),
                total_size,
            });
        decode_json(send(request, "directory").await?).await
    }

    /// Commits `plan` exactly as the directory issued it.
    pub async fn commit_write(&self, plan: &WritePlan) -> ClusterResult<CommitResponse> {
        let request = self
            .http
            .post(self.url(ENDPOINT_COMMIT_WRITE))
            .json(&CommitRequest {
                file_name: plan.file_name.clone(),
                total_size: plan.total_size,
                blocks: plan.blocks.clone(),
            });
        decode_json(send(request, "directory").await?).await
    }

    pub async fn get_read_plan(&self, file_name: &str) -> ClusterResult<ReadPlan> {
        let request = self
            .http
            .get(self.url(ENDPOINT_READ_PLAN))
            .query(&[("file_name", file_name)]);
        decode_json(send(request, "directory").await?).await
    }

    pub async fn list_files(&self) -> ClusterResult<Vec<String>> {
        let request = self.http.get(self.url(ENDPOINT_LIST_FILES));
        let listing: FileListResponse = decode_json(send(request, "directory").await?).await?;
        Ok(listing.files)
    }

    pub async fn list_nodes(&self) -> ClusterResult<Vec<NodeEntry>> {
        let request = self.http.get(self.url(ENDPOINT_LIST_NODES));
        let listing: NodeListResponse = decode_json(send(request, "directory").await?).await?;
        Ok(listing.nodes)
    }

    pub async fn health(&self) -> ClusterResult<HealthResponse> {
        let request = self.http.get(self.url(ENDPOINT_HEALTH));
        decode_json(send(request, "directory").await?).await
    }
}

/// Typed client of the storage nodes. Stateless apart from the connection pool, so one
/// instance talks to every node.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
}

impl StorageClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn block_url(node: &NodeEntry, block_id: &BlockId) -> ClusterResult<Url> {
        let mut url = Url::parse(&format!("{}{}", node.base_url(), ENDPOINT_BLOCKS))
            .map_err(|e| ClusterError::InvalidRequest(format!("bad node address {}: {}", node.addr, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClusterError::InvalidRequest(format!("bad node address {}", node.addr)))?
            .push(block_id.as_str());
        Ok(url)
    }

    pub async fn store_block(
        &self,
        node: &NodeEntry,
        block_id: &BlockId,
        payload: Bytes,
    ) -> ClusterResult<StoreBlockResponse> {
        let request = self
            .http
            .put(Self::block_url(node, block_id)?)
            .header(reqwest::header::CONTENT_TYPE, OCTET_STREAM)
            .body(payload);
        decode_json(send(request, &node.id.0).await?).await
    }

    pub async fn fetch_block(&self, node: &NodeEntry, block_id: &BlockId) -> ClusterResult<Bytes> {
        let request = self.http.get(Self::block_url(node, block_id)?);
        let response = send(request, &node.id.0).await?;
        response.bytes().await.map_err(|e| {
            ClusterError::NodeUnreachable(format!("{}: reading block {}: {}", node.id, block_id, e))
        })
    }

    pub async fn health(&self, node: &NodeEntry) -> ClusterResult<HealthResponse> {
        let request = self
            .http
            .get(format!("{}{}", node.base_url(), ENDPOINT_HEALTH));
        decode_json(send(request, &node.id.0).await?).await
    }
}

/// Sends `request` and turns transport failures and error statuses into `ClusterError`s.
///
/// Error responses carry an `ErrorResponse` body that is rebuilt into the typed error.
async fn send(request: RequestBuilder, target: &str) -> ClusterResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ClusterError::NodeUnreachable(format!("{}: {}", target, e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match response.json::<ErrorResponse>().await {
        Ok(body) => Err(ClusterError::from_kind(body.kind, body.message)),
        Err(_) => Err(ClusterError::Protocol(format!(
            "{} answered {} without an error body",
            target, status
        ))),
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> ClusterResult<T> {
    let url = response.url().clone();
    response
        .json::<T>()
        .await
        .map_err(|e| ClusterError::Protocol(format!("unexpected response from {}: {}", url, e)))
}
