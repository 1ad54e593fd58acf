use async_trait::async_trait;

use super::{ClientError, HttpBackend};
use crate::cluster::{Cluster, ClusterSpecification, Constraints, Credentials};

// ============================================================================
// SBIO: Trait for abstraction (allows mocking in tests)
// ============================================================================

/// Cluster lifecycle operations of the garden service, one round trip each
#[async_trait]
pub trait GardenClientTrait: Send + Sync {
    async fn create(&self, spec: &ClusterSpecification) -> Result<Cluster, ClientError>;

    async fn list(&self) -> Result<Vec<Cluster>, ClientError>;

    async fn get(&self, id: &str) -> Result<Cluster, ClientError>;

    async fn delete(&self, id: &str) -> Result<Cluster, ClientError>;

    async fn credentials(&self, id: &str) -> Result<Credentials, ClientError>;

    async fn constraints(&self) -> Result<Constraints, ClientError>;
}

// ============================================================================
// SBIO: I/O implementation (real HTTP client)
// ============================================================================

#[derive(Clone)]
pub struct GardenClient {
    backend: HttpBackend,
}

impl GardenClient {
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
impl GardenClientTrait for GardenClient {
    async fn create(&self, spec: &ClusterSpecification) -> Result<Cluster, ClientError> {
        let req = self
            .backend
            .request(reqwest::Method::POST, &["v1", "cluster"])?
            .json(spec);
        self.backend.send(req).await
    }

    async fn list(&self) -> Result<Vec<Cluster>, ClientError> {
        let req = self.backend.request(reqwest::Method::GET, &["v1", "cluster"])?;
        self.backend.send(req).await
    }

    async fn get(&self, id: &str) -> Result<Cluster, ClientError> {
        let req = self
            .backend
            .request(reqwest::Method::GET, &["v1", "cluster", id])?;
        self.backend.send(req).await
    }

    async fn delete(&self, id: &str) -> Result<Cluster, ClientError> {
        let req = self
            .backend
            .request(reqwest::Method::DELETE, &["v1", "cluster", id])?;
        self.backend.send(req).await
    }

    async fn credentials(&self, id: &str) -> Result<Credentials, ClientError> {
        let req = self
            .backend
            .request(reqwest::Method::GET, &["v1", "cluster", id, "credentials"])?;
        self.backend.send(req).await
    }

    async fn constraints(&self) -> Result<Constraints, ClientError> {
        let req = self
            .backend
            .request(reqwest::Method::GET, &["v1", "cluster-constraints"])?;
        self.backend.send(req).await
    }
}

// ============================================================================
// SBIO: Mock implementation for testing (no I/O)
// ============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::cluster::ClusterMetadata;
    use std::sync::{Arc, Mutex};

    /// Records every call as `op` or `op:argument`, in order
    pub struct MockGardenClient {
        calls: Arc<Mutex<Vec<String>>>,
        created: Arc<Mutex<Vec<ClusterSpecification>>>,
        fail_create: bool,
    }

    impl MockGardenClient {
        pub fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                created: Arc::new(Mutex::new(Vec::new())),
                fail_create: false,
            }
        }

        /// A client whose create calls are rejected
        pub fn failing_create() -> Self {
            Self {
                fail_create: true,
                ..Self::new()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn created(&self) -> Vec<ClusterSpecification> {
            self.created.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn cluster(id: &str) -> Cluster {
            Cluster {
                metadata: ClusterMetadata {
                    name: "demo".to_string(),
                    namespace: "garden-p1".to_string(),
                    uid: id.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl GardenClientTrait for MockGardenClient {
        async fn create(&self, spec: &ClusterSpecification) -> Result<Cluster, ClientError> {
            self.record(format!("create:{}", spec.name));
            if self.fail_create {
                return Err(ClientError::Api {
                    status: 422,
                    message: "quota exceeded".to_string(),
                });
            }
            self.created.lock().unwrap().push(spec.clone());
            Ok(Cluster {
                spec: spec.clone(),
                ..Self::cluster("mock-uid")
            })
        }

        async fn list(&self) -> Result<Vec<Cluster>, ClientError> {
            self.record("list".to_string());
            Ok(vec![Self::cluster("a"), Self::cluster("b")])
        }

        async fn get(&self, id: &str) -> Result<Cluster, ClientError> {
            self.record(format!("get:{}", id));
            Ok(Self::cluster(id))
        }

        async fn delete(&self, id: &str) -> Result<Cluster, ClientError> {
            self.record(format!("delete:{}", id));
            Ok(Self::cluster(id))
        }

        async fn credentials(&self, id: &str) -> Result<Credentials, ClientError> {
            self.record(format!("credentials:{}", id));
            Ok(Credentials {
                kubeconfig: format!("apiVersion: v1\nkind: Config\n# {}\n", id),
            })
        }

        async fn constraints(&self) -> Result<Constraints, ClientError> {
            self.record("constraints".to_string());
            Ok(Constraints {
                kubernetes_versions: vec!["1.14.3".to_string()],
                partitions: vec!["nbg-w8101".to_string()],
            })
        }
    }
}
