//! cloudctl: provision and manage Kubernetes clusters on garden and metal
//!
//! - `cluster`: request parameters, defaults and the cluster-creation document
//! - `client`: HTTP clients for the garden and metal services
//! - `context`: named connection settings stored in `~/.cloudctl/config`
//! - `cli`: argument parsing, command orchestration and output rendering

pub mod cli;
pub mod client;
pub mod cluster;
pub mod context;
