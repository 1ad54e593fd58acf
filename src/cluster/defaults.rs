//! Built-in defaults for cluster creation
//!
//! Machine types are fixed per partition and role. Everything else a cluster
//! needs but the user does not choose (images, volumes, load balancer,
//! maintenance window) lives here as a constant.

use thiserror::Error;

use super::types::MachineImage;

/// Default volume type attached to every worker
pub const DEFAULT_VOLUME_TYPE: &str = "storage_1";

/// Default volume size attached to every worker
pub const DEFAULT_VOLUME_SIZE: &str = "50Gi";

/// Default firewall image
pub const DEFAULT_FIREWALL_IMAGE: &str = "firewall-1";

/// Default load balancer provider
pub const DEFAULT_LOAD_BALANCER_PROVIDER: &str = "metallb";

/// Name of the single worker pool every cluster gets
pub const DEFAULT_WORKER_NAME: &str = "default-worker";

/// Maintenance window begin (22:00 at UTC+1)
pub const MAINTENANCE_WINDOW_BEGIN: &str = "220000+0100";

/// Maintenance window end (23:30 at UTC+1)
pub const MAINTENANCE_WINDOW_END: &str = "233000+0100";

const DEFAULT_MACHINE_IMAGE_NAME: &str = "ubuntu";
const DEFAULT_MACHINE_IMAGE_VERSION: &str = "19.04";

/// Machine types per partition: (partition, worker, firewall)
const MACHINE_TYPES_OF_PARTITION: &[(&str, &str, &str)] = &[
    ("nbg-w8101", "c1-xlarge-x86", "c1-xlarge-x86"),
    ("fra-equ01", "c1-xlarge-x86", "c1-xlarge-x86"),
];

/// Role a machine plays in a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineRole {
    Worker,
    Firewall,
}

impl MachineRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineRole::Worker => "worker",
            MachineRole::Firewall => "firewall",
        }
    }
}

impl std::fmt::Display for MachineRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DefaultsError {
    #[error("no default machine types known for partition '{partition}' (known: {known})")]
    UnknownPartition { partition: String, known: String },
}

/// Look up the machine type for a role in a partition.
pub fn machine_type(partition: &str, role: MachineRole) -> Result<&'static str, DefaultsError> {
    MACHINE_TYPES_OF_PARTITION
        .iter()
        .find(|(name, _, _)| *name == partition)
        .map(|(_, worker, firewall)| match role {
            MachineRole::Worker => *worker,
            MachineRole::Firewall => *firewall,
        })
        .ok_or_else(|| DefaultsError::UnknownPartition {
            partition: partition.to_string(),
            known: known_partitions().join(", "),
        })
}

/// Partitions with configured machine types
pub fn known_partitions() -> Vec<&'static str> {
    MACHINE_TYPES_OF_PARTITION
        .iter()
        .map(|(name, _, _)| *name)
        .collect()
}

/// Machine image used for worker nodes
pub fn default_machine_image() -> MachineImage {
    MachineImage {
        name: DEFAULT_MACHINE_IMAGE_NAME.to_string(),
        version: DEFAULT_MACHINE_IMAGE_VERSION.to_string(),
    }
}
