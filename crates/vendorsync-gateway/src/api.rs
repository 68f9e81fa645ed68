/*
[INPUT]:  Status queries and action dispatch requests
[OUTPUT]: Job status snapshots and open JSON dispatch responses
[POS]:    HTTP layer - bridge endpoints and runner-facing trait seams
[UPDATE]: When adding new bridge endpoints or changing payloads
*/

use crate::client::BridgeClient;
use crate::error::Result;
use crate::types::{ActionRequest, JobStatus};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

/// Dispatches one remote action and returns the raw JSON response.
///
/// The response shape is open by design: which fields matter is decided per
/// step by the caller's extraction strategy.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn dispatch(&self, request: &ActionRequest) -> Result<Value>;
}

/// Fetches the progress snapshot of the long-running remote job.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, params: &[(String, String)]) -> Result<JobStatus>;
}

impl BridgeClient {
    /// Query the long-running job status
    ///
    /// GET /sync/status?{params}
    pub async fn fetch_status(&self, params: &[(String, String)]) -> Result<JobStatus> {
        let builder = self.request(Method::GET, "/sync/status")?.query(params);
        self.send_json(builder).await
    }

    /// Dispatch one action against the bridge
    ///
    /// POST /sync/dispatch with body `{action, ...params}`
    pub async fn dispatch(&self, request: &ActionRequest) -> Result<Value> {
        let builder = self
            .request(Method::POST, "/sync/dispatch")?
            .json(&request.to_body());
        self.send_json(builder).await
    }
}

#[async_trait]
impl ActionDispatcher for BridgeClient {
    async fn dispatch(&self, request: &ActionRequest) -> Result<Value> {
        BridgeClient::dispatch(self, request).await
    }
}

#[async_trait]
impl<T: ActionDispatcher + ?Sized> ActionDispatcher for std::sync::Arc<T> {
    async fn dispatch(&self, request: &ActionRequest) -> Result<Value> {
        (**self).dispatch(request).await
    }
}

#[async_trait]
impl StatusSource for BridgeClient {
    async fn fetch_status(&self, params: &[(String, String)]) -> Result<JobStatus> {
        BridgeClient::fetch_status(self, params).await
    }
}
