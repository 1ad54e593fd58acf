//! Turns user parameters into a cluster-creation document
//!
//! SBIO pattern: everything here is pure. The builder is created from
//! validated parameters before any remote call, and only yields a
//! [`ClusterSpecification`] once it is handed an [`AcquiredNetwork`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use super::defaults::{self, DefaultsError, MachineRole};
use super::types::{
    ClusterSpecification, Kubernetes, Maintenance, MaintenanceAutoUpdate, MaintenanceTimeWindow,
    Purpose, Worker,
};
use crate::client::metal::{NetworkAcquireRequest, NetworkAcquireResult};

/// Longest cluster name the garden service accepts
pub const MAX_NAME_LEN: usize = 10;

pub const DEFAULT_KUBERNETES_VERSION: &str = "1.14.3";

pub const DEFAULT_EXTERNAL_NETWORK: &str = "internet";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Defaults(#[from] DefaultsError),

    #[error("node network creation failed, no or more than one entry for prefixes was/were acquired")]
    NodeNetwork { prefixes: usize },
}

impl BuildError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        BuildError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Everything the user can say about a new cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRequestParams {
    pub name: String,
    pub description: String,
    pub purpose: Purpose,
    pub owner: String,
    pub project: String,
    pub partition: String,
    pub version: String,
    pub min_size: u32,
    pub max_size: u32,
    pub max_surge: u32,
    pub max_unavailable: u32,
    pub labels: BTreeMap<String, String>,
    pub external_networks: Vec<String>,
    pub allow_privileged: bool,
}

impl Default for ClusterRequestParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            purpose: Purpose::default(),
            owner: String::new(),
            project: String::new(),
            partition: String::new(),
            version: DEFAULT_KUBERNETES_VERSION.to_string(),
            min_size: 1,
            max_size: 1,
            max_surge: 1,
            max_unavailable: 1,
            labels: BTreeMap::new(),
            external_networks: vec![DEFAULT_EXTERNAL_NETWORK.to_string()],
            allow_privileged: false,
        }
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("cluster name pattern is valid")
    })
}

impl ClusterRequestParams {
    /// Check the parameters without touching any service.
    pub fn validate(&self) -> Result<(), BuildError> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("owner", &self.owner),
            ("project", &self.project),
            ("partition", &self.partition),
            ("version", &self.version),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(BuildError::invalid(field, "must not be empty"));
            }
        }

        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(BuildError::invalid(
                "name",
                format!("'{}' is longer than {} characters", self.name, MAX_NAME_LEN),
            ));
        }
        if !name_pattern().is_match(&self.name) {
            return Err(BuildError::invalid(
                "name",
                format!(
                    "'{}' must consist of lower case alphanumerics and '-', starting and ending alphanumeric",
                    self.name
                ),
            ));
        }

        if self.max_size == 0 {
            return Err(BuildError::invalid("maxsize", "must be at least 1"));
        }
        if self.min_size > self.max_size {
            return Err(BuildError::invalid(
                "minsize",
                format!(
                    "{} is greater than maxsize {}",
                    self.min_size, self.max_size
                ),
            ));
        }

        if self.external_networks.iter().any(|n| n.trim().is_empty()) {
            return Err(BuildError::invalid(
                "external-networks",
                "network identifiers must not be empty",
            ));
        }

        Ok(())
    }
}

/// Parse `key=value` pairs into a label set.
pub fn parse_labels(raw: &[String]) -> Result<BTreeMap<String, String>, BuildError> {
    let mut labels = BTreeMap::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| BuildError::invalid("labels", format!("'{}' is not key=value", entry)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(BuildError::invalid(
                "labels",
                format!("'{}' has an empty key", entry),
            ));
        }
        labels.insert(key.to_string(), value.trim().to_string());
    }
    Ok(labels)
}

/// Who a cluster belongs to.
///
/// All three fields are fed from the owner flag for now. Deriving them from
/// the authenticated caller only has to change [`Identity::from_owner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub owner: String,
    pub created_by: String,
    pub tenant: String,
}

impl Identity {
    pub fn from_owner(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            created_by: owner.to_string(),
            tenant: owner.to_string(),
        }
    }
}

/// A node network holding exactly one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredNetwork {
    pub id: String,
    pub prefix: String,
}

impl TryFrom<NetworkAcquireResult> for AcquiredNetwork {
    type Error = BuildError;

    fn try_from(result: NetworkAcquireResult) -> Result<Self, Self::Error> {
        let network = result.network;
        match <[String; 1]>::try_from(network.prefixes) {
            Ok([prefix]) => Ok(AcquiredNetwork {
                id: network.id,
                prefix,
            }),
            Err(prefixes) => Err(BuildError::NodeNetwork {
                prefixes: prefixes.len(),
            }),
        }
    }
}

/// Machine types resolved for a partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineTypes {
    pub worker: String,
    pub firewall: String,
}

impl MachineTypes {
    pub fn for_partition(partition: &str) -> Result<Self, DefaultsError> {
        Ok(Self {
            worker: defaults::machine_type(partition, MachineRole::Worker)?.to_string(),
            firewall: defaults::machine_type(partition, MachineRole::Firewall)?.to_string(),
        })
    }
}

/// Holds a validated request until the node network is known
#[derive(Debug, Clone)]
pub struct SpecificationBuilder {
    params: ClusterRequestParams,
    identity: Identity,
    machine_types: MachineTypes,
}

impl SpecificationBuilder {
    /// Validate the parameters and resolve all defaults up front.
    pub fn new(params: ClusterRequestParams) -> Result<Self, BuildError> {
        params.validate()?;
        let machine_types = MachineTypes::for_partition(&params.partition)?;
        let identity = Identity::from_owner(&params.owner);
        Ok(Self {
            params,
            identity,
            machine_types,
        })
    }

    /// Request for the cluster's node network
    pub fn network_request(&self) -> NetworkAcquireRequest {
        NetworkAcquireRequest {
            name: self.params.name.clone(),
            description: self.params.description.clone(),
            partition_id: self.params.partition.clone(),
            project_id: self.params.project.clone(),
        }
    }

    pub fn build(self, network: &AcquiredNetwork) -> ClusterSpecification {
        let Self {
            params,
            identity,
            machine_types,
        } = self;

        let worker = Worker {
            name: defaults::DEFAULT_WORKER_NAME.to_string(),
            machine_type: machine_types.worker,
            auto_scaler_min: params.min_size,
            auto_scaler_max: params.max_size,
            max_surge: params.max_surge,
            max_unavailable: params.max_unavailable,
            volume_type: defaults::DEFAULT_VOLUME_TYPE.to_string(),
            volume_size: defaults::DEFAULT_VOLUME_SIZE.to_string(),
        };

        ClusterSpecification {
            name: params.name,
            description: Some(params.description),
            purpose: Some(params.purpose),
            owner: identity.owner,
            created_by: identity.created_by,
            tenant: identity.tenant,
            project_id: params.project,
            load_balancer_provider: defaults::DEFAULT_LOAD_BALANCER_PROVIDER.to_string(),
            machine_image: defaults::default_machine_image(),
            firewall_image: defaults::DEFAULT_FIREWALL_IMAGE.to_string(),
            firewall_size: machine_types.firewall,
            workers: vec![worker],
            kubernetes: Kubernetes {
                version: params.version,
                allow_privileged_containers: params.allow_privileged,
            },
            maintenance: Maintenance {
                auto_update: MaintenanceAutoUpdate {
                    kubernetes_version: false,
                    machine_image: false,
                },
                time_window: MaintenanceTimeWindow {
                    begin: defaults::MAINTENANCE_WINDOW_BEGIN.to_string(),
                    end: defaults::MAINTENANCE_WINDOW_END.to_string(),
                },
            },
            node_network: network.prefix.clone(),
            additional_networks: params.external_networks,
            zones: vec![params.partition],
            labels: params.labels,
        }
    }
}

/// Validate, resolve defaults and build in one step.
pub fn build_specification(
    params: ClusterRequestParams,
    network: &AcquiredNetwork,
) -> Result<ClusterSpecification, BuildError> {
    Ok(SpecificationBuilder::new(params)?.build(network))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::metal::Network;

    fn demo_params() -> ClusterRequestParams {
        ClusterRequestParams {
            name: "demo".to_string(),
            description: "d".to_string(),
            owner: "alice".to_string(),
            project: "p1".to_string(),
            partition: "nbg-w8101".to_string(),
            ..Default::default()
        }
    }

    fn network(prefixes: &[&str]) -> NetworkAcquireResult {
        NetworkAcquireResult {
            network: Network {
                id: "nw-1".to_string(),
                prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                ..Default::default()
            },
        }
    }

    fn acquired() -> AcquiredNetwork {
        AcquiredNetwork {
            id: "nw-1".to_string(),
            prefix: "10.0.0.0/22".to_string(),
        }
    }

    #[test]
    fn test_build_demo_with_defaults() {
        let spec = build_specification(demo_params(), &acquired()).unwrap();

        let machine_type = defaults::machine_type("nbg-w8101", MachineRole::Worker).unwrap();
        let firewall_type = defaults::machine_type("nbg-w8101", MachineRole::Firewall).unwrap();

        assert_eq!(spec.workers.len(), 1);
        let worker = &spec.workers[0];
        assert_eq!(worker.name, "default-worker");
        assert_eq!(worker.machine_type, machine_type);
        assert_eq!(worker.auto_scaler_min, 1);
        assert_eq!(worker.auto_scaler_max, 1);
        assert_eq!(worker.max_surge, 1);
        assert_eq!(worker.max_unavailable, 1);
        assert_eq!(worker.volume_type, defaults::DEFAULT_VOLUME_TYPE);
        assert_eq!(worker.volume_size, defaults::DEFAULT_VOLUME_SIZE);

        assert_eq!(spec.firewall_size, firewall_type);
        assert_eq!(spec.firewall_image, defaults::DEFAULT_FIREWALL_IMAGE);
        assert_eq!(spec.machine_image, defaults::default_machine_image());
        assert_eq!(
            spec.load_balancer_provider,
            defaults::DEFAULT_LOAD_BALANCER_PROVIDER
        );
        assert_eq!(spec.node_network, "10.0.0.0/22");
        assert_eq!(spec.additional_networks, vec!["internet"]);
        assert_eq!(spec.zones, vec!["nbg-w8101"]);
        assert_eq!(spec.purpose, Some(Purpose::Production));
        assert_eq!(spec.kubernetes.version, "1.14.3");
        assert!(!spec.kubernetes.allow_privileged_containers);
    }

    #[test]
    fn test_identity_fields_follow_owner() {
        let spec = build_specification(demo_params(), &acquired()).unwrap();
        assert_eq!(spec.owner, "alice");
        assert_eq!(spec.created_by, "alice");
        assert_eq!(spec.tenant, "alice");
    }

    #[test]
    fn test_maintenance_is_fixed() {
        let spec = build_specification(demo_params(), &acquired()).unwrap();
        assert!(!spec.maintenance.auto_update.kubernetes_version);
        assert!(!spec.maintenance.auto_update.machine_image);
        assert_eq!(spec.maintenance.time_window.begin, "220000+0100");
        assert_eq!(spec.maintenance.time_window.end, "233000+0100");
    }

    #[test]
    fn test_user_values_pass_through() {
        let mut params = demo_params();
        params.purpose = Purpose::Eval;
        params.version = "1.15.0".to_string();
        params.min_size = 2;
        params.max_size = 5;
        params.max_surge = 2;
        params.max_unavailable = 0;
        params.external_networks = vec!["internet".to_string(), "mpls".to_string()];
        params.allow_privileged = true;
        params.labels = parse_labels(&["team=infra".to_string()]).unwrap();

        let spec = build_specification(params, &acquired()).unwrap();
        let worker = &spec.workers[0];
        assert_eq!(worker.auto_scaler_min, 2);
        assert_eq!(worker.auto_scaler_max, 5);
        assert_eq!(worker.max_surge, 2);
        assert_eq!(worker.max_unavailable, 0);
        assert_eq!(spec.additional_networks, vec!["internet", "mpls"]);
        assert!(spec.kubernetes.allow_privileged_containers);
        assert_eq!(spec.kubernetes.version, "1.15.0");
        assert_eq!(spec.purpose, Some(Purpose::Eval));
        assert_eq!(spec.labels.get("team"), Some(&"infra".to_string()));
    }

    #[test]
    fn test_unknown_partition() {
        let mut params = demo_params();
        params.partition = "mars-01".to_string();
        let err = SpecificationBuilder::new(params).unwrap_err();
        assert!(matches!(err, BuildError::Defaults(_)));
    }

    #[test]
    fn test_network_request() {
        let builder = SpecificationBuilder::new(demo_params()).unwrap();
        let request = builder.network_request();
        assert_eq!(request.name, "demo");
        assert_eq!(request.description, "d");
        assert_eq!(request.partition_id, "nbg-w8101");
        assert_eq!(request.project_id, "p1");
    }

    #[test]
    fn test_acquired_network_single_prefix() {
        let acquired = AcquiredNetwork::try_from(network(&["10.0.0.0/22"])).unwrap();
        assert_eq!(acquired.id, "nw-1");
        assert_eq!(acquired.prefix, "10.0.0.0/22");
    }

    #[test]
    fn test_acquired_network_no_prefix() {
        let err = AcquiredNetwork::try_from(network(&[])).unwrap_err();
        assert_eq!(err, BuildError::NodeNetwork { prefixes: 0 });
        assert_eq!(
            err.to_string(),
            "node network creation failed, no or more than one entry for prefixes was/were acquired"
        );
    }

    #[test]
    fn test_acquired_network_many_prefixes() {
        let err =
            AcquiredNetwork::try_from(network(&["10.0.0.0/22", "10.0.4.0/22"])).unwrap_err();
        assert_eq!(err, BuildError::NodeNetwork { prefixes: 2 });
    }

    #[test]
    fn test_validate_required_fields() {
        for field in ["name", "description", "owner", "project", "partition"] {
            let mut params = demo_params();
            match field {
                "name" => params.name.clear(),
                "description" => params.description.clear(),
                "owner" => params.owner.clear(),
                "project" => params.project.clear(),
                _ => params.partition.clear(),
            }
            match params.validate() {
                Err(BuildError::Invalid { field: f, .. }) => assert_eq!(f, field),
                other => panic!("Expected invalid {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_validate_name_length() {
        let mut params = demo_params();
        params.name = "abcdefghij".to_string();
        assert!(params.validate().is_ok());

        params.name = "abcdefghijk".to_string();
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("longer than 10"));
    }

    #[test]
    fn test_validate_name_charset() {
        let mut params = demo_params();
        params.name = "Demo_1".to_string();
        assert!(matches!(
            params.validate(),
            Err(BuildError::Invalid { field: "name", .. })
        ));

        params.name = "demo-1".to_string();
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_sizes() {
        let mut params = demo_params();
        params.min_size = 3;
        params.max_size = 2;
        assert!(matches!(
            params.validate(),
            Err(BuildError::Invalid { field: "minsize", .. })
        ));

        params.min_size = 0;
        params.max_size = 0;
        assert!(matches!(
            params.validate(),
            Err(BuildError::Invalid { field: "maxsize", .. })
        ));
    }

    #[test]
    fn test_validate_empty_network() {
        let mut params = demo_params();
        params.external_networks = vec!["".to_string()];
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_parse_labels() {
        let labels =
            parse_labels(&["team=infra".to_string(), "env = prod".to_string()]).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["env"], "prod");

        assert!(parse_labels(&["novalue".to_string()]).is_err());
        assert!(parse_labels(&["=x".to_string()]).is_err());
    }
}
