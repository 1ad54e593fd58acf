//! Documents exchanged with the garden service
//!
//! `ClusterSpecification` is what we submit on create. `Cluster` is what the
//! service hands back for every lifecycle call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a cluster is used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    #[default]
    Production,
    Dev,
    Eval,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Production => "production",
            Purpose::Dev => "dev",
            Purpose::Eval => "eval",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Purpose::Production),
            "dev" => Ok(Purpose::Dev),
            "eval" => Ok(Purpose::Eval),
            other => Err(format!(
                "invalid purpose '{}', must be one of production|dev|eval",
                other
            )),
        }
    }
}

/// Operating system image of the worker machines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineImage {
    pub name: String,
    pub version: String,
}

/// A worker pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Worker {
    pub name: String,
    pub machine_type: String,
    pub auto_scaler_min: u32,
    pub auto_scaler_max: u32,
    pub max_surge: u32,
    pub max_unavailable: u32,
    pub volume_type: String,
    pub volume_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Kubernetes {
    pub version: String,
    pub allow_privileged_containers: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenanceAutoUpdate {
    pub kubernetes_version: bool,
    pub machine_image: bool,
}

/// Daily window, formatted `HHMMSS+ZZZZ`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceTimeWindow {
    pub begin: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Maintenance {
    pub auto_update: MaintenanceAutoUpdate,
    pub time_window: MaintenanceTimeWindow,
}

/// The cluster-creation document submitted to the garden service.
///
/// The service echoes it back inside every [`Cluster`] record, possibly
/// incomplete, so every field falls back to its default when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<Purpose>,
    pub owner: String,
    pub created_by: String,
    pub tenant: String,
    #[serde(rename = "projectID")]
    pub project_id: String,

    pub load_balancer_provider: String,
    pub machine_image: MachineImage,
    pub firewall_image: String,
    /// Machine type of the firewall
    pub firewall_size: String,

    pub workers: Vec<Worker>,
    pub kubernetes: Kubernetes,
    pub maintenance: Maintenance,

    /// CIDR of the acquired node network
    pub node_network: String,
    pub additional_networks: Vec<String>,
    pub zones: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ClusterSpecification {
    /// The partition is carried as the single availability zone
    pub fn partition(&self) -> Option<&str> {
        self.zones.first().map(String::as_str)
    }
}

/// Metadata of a cluster record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterMetadata {
    pub name: String,
    pub namespace: String,
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Last operation the garden service ran on a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LastOperation {
    #[serde(rename = "type")]
    pub operation_type: String,
    pub state: String,
    pub progress: u32,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub reason: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ClusterCondition>,
}

/// A cluster as reported by the garden service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    pub metadata: ClusterMetadata,
    pub spec: ClusterSpecification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,
}

impl Cluster {
    /// Short human readable state, e.g. "Create Processing (40%)"
    pub fn state(&self) -> String {
        match self.status.as_ref().and_then(|s| s.last_operation.as_ref()) {
            Some(op) => format!("{} {} ({}%)", op.operation_type, op.state, op.progress),
            None => "Unknown".to_string(),
        }
    }
}

/// Access material of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub kubeconfig: String,
}

/// Inputs the garden service accepts for new clusters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    pub kubernetes_versions: Vec<String>,
    pub partitions: Vec<String>,
}
