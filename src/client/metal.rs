use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ClientError, HttpBackend};

// ============================================================================
// Data structures (pure, no I/O)
// ============================================================================

/// Request for a dedicated node network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAcquireRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "partitionid")]
    pub partition_id: String,
    #[serde(rename = "projectid")]
    pub project_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "partitionid")]
    pub partition_id: String,
    #[serde(rename = "projectid")]
    pub project_id: String,
    pub prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAcquireResult {
    pub network: Network,
}

// ============================================================================
// SBIO: Trait for abstraction (allows mocking in tests)
// ============================================================================

#[async_trait]
pub trait MetalClientTrait: Send + Sync {
    async fn acquire_network(
        &self,
        request: &NetworkAcquireRequest,
    ) -> Result<NetworkAcquireResult, ClientError>;

    /// Give a previously acquired network back
    async fn release_network(&self, id: &str) -> Result<Network, ClientError>;
}

// ============================================================================
// SBIO: I/O implementation (real HTTP client)
// ============================================================================

#[derive(Clone)]
pub struct MetalClient {
    backend: HttpBackend,
}

impl MetalClient {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            backend: HttpBackend::new(base_url, api_token, timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.backend.base_url()
    }
}

#[async_trait]
impl MetalClientTrait for MetalClient {
    async fn acquire_network(
        &self,
        request: &NetworkAcquireRequest,
    ) -> Result<NetworkAcquireResult, ClientError> {
        let req = self
            .backend
            .request(reqwest::Method::POST, &["v1", "network", "acquire"])?
            .json(request);
        self.backend.send(req).await
    }

    async fn release_network(&self, id: &str) -> Result<Network, ClientError> {
        let req = self
            .backend
            .request(reqwest::Method::DELETE, &["v1", "network", id])?;
        self.backend.send(req).await
    }
}

// ============================================================================
// SBIO: Mock implementation for testing (no I/O)
// ============================================================================
