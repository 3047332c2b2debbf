//! HTTP client helpers for tests.

use crossrank::gateway::{
    ErrorResponse, HealthResponse, RerankRequest, RerankResponse, RootResponse, ScoreResponse,
    SimpleRerankResponse,
};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    pub async fn root(&self) -> Result<RootResponse, TestClientError> {
        let resp = self.client.get(self.url("/")).send().await?;
        Self::decode(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Self::decode(resp).await
    }

    pub async fn rerank(&self, request: &RerankRequest) -> Result<RerankResponse, TestClientError> {
        let resp = self
            .client
            .post(self.url("/rerank"))
            .json(request)
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Sends an arbitrary JSON body to `/rerank`.
    pub async fn rerank_raw(
        &self,
        body: &serde_json::Value,
    ) -> Result<RerankResponse, TestClientError> {
        let resp = self
            .client
            .post(self.url("/rerank"))
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn rerank_simple(
        &self,
        query: &str,
        documents: &[&str],
        top_k: Option<usize>,
    ) -> Result<SimpleRerankResponse, TestClientError> {
        let mut params: Vec<(&str, String)> = vec![("query", query.to_string())];
        params.extend(documents.iter().map(|d| ("documents", d.to_string())));
        if let Some(k) = top_k {
            params.push(("top_k", k.to_string()));
        }

        let resp = self
            .client
            .post(self.url("/rerank/simple"))
            .query(&params)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn score(
        &self,
        query: &str,
        document: &str,
        normalize: Option<bool>,
    ) -> Result<ScoreResponse, TestClientError> {
        let mut params: Vec<(&str, String)> = vec![
            ("query", query.to_string()),
            ("document", document.to_string()),
        ];
        if let Some(normalize) = normalize {
            params.push(("normalize", normalize.to_string()));
        }

        let resp = self
            .client
            .post(self.url("/score"))
            .query(&params)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, TestClientError> {
        let status = resp.status().as_u16();
        let status_header = resp
            .headers()
            .get(crossrank::RERANK_STATUS_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        match status {
            200 => Ok(resp.json().await?),
            400 => Err(TestClientError::BadRequest(Self::error_message(resp).await)),
            503 => Err(TestClientError::NotReady(status_header)),
            status => Err(TestClientError::UnexpectedStatus(
                status,
                Self::error_message(resp).await,
            )),
        }
    }

    async fn error_message(resp: reqwest::Response) -> String {
        let body = resp.text().await.unwrap_or_default();
        serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service not ready (status header: {0})")]
    NotReady(String),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),
}

pub fn rerank_request(query: &str, documents: &[&str], top_k: Option<usize>) -> RerankRequest {
    RerankRequest {
        query: query.to_string(),
        documents: documents.iter().map(|d| d.to_string()).collect(),
        top_k,
        normalize: None,
    }
}
