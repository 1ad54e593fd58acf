//! # Cluster requests
//!
//! Everything needed to describe a cluster to the garden service.
//!
//! ## Flow
//!
//! ```text
//! ClusterRequestParams ──validate──▶ SpecificationBuilder ──network_request──▶ metal
//!                                           │                                  │
//!                                           │◀──────── AcquiredNetwork ────────┘
//!                                           ▼
//!                                  ClusterSpecification ──create──▶ garden
//! ```
//!
//! - `defaults`: machine types per partition and the fixed cluster defaults
//! - `builder`: validation, identity resolution, document assembly
//! - `types`: documents sent to and received from the garden service

pub mod builder;
pub mod defaults;
pub mod types;

pub use builder::{
    build_specification, parse_labels, AcquiredNetwork, BuildError, ClusterRequestParams,
    Identity, MachineTypes, SpecificationBuilder,
};
pub use defaults::{machine_type, DefaultsError, MachineRole};
pub use types::{
    Cluster, ClusterMetadata, ClusterSpecification, ClusterStatus, Constraints, Credentials,
    LastOperation, MachineImage, Purpose, Worker,
};
