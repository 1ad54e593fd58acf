//! CLI module for cloudctl
//!
//! Provides subcommands:
//! - `cloudctl cluster create` - Acquire a node network and create a cluster
//! - `cloudctl cluster list` - List clusters
//! - `cloudctl cluster delete <id>` - Delete a cluster after confirmation
//! - `cloudctl cluster describe <id>` - Show a cluster as YAML
//! - `cloudctl cluster credentials <id>` - Print a cluster's kubeconfig
//! - `cloudctl cluster inputs` - Show accepted kubernetes versions and partitions
//! - `cloudctl context` - Manage contexts

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::cluster::builder::{DEFAULT_EXTERNAL_NETWORK, DEFAULT_KUBERNETES_VERSION};
use crate::cluster::Purpose;
use crate::context::Overrides;

mod commands;
mod display;
mod prompt;

pub use commands::*;
pub use display::*;
pub use prompt::*;

#[derive(Parser, Debug)]
#[command(name = "cloudctl")]
#[command(about = "Provision and manage Kubernetes clusters")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: ~/.cloudctl/config)
    #[arg(long, global = true, env = "CLOUDCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Context to use instead of the current one
    #[arg(long, global = true, env = "CLOUDCTL_CONTEXT")]
    pub context: Option<String>,

    /// Garden API URL, overrides the context
    #[arg(long, global = true, env = "CLOUDCTL_GARDEN_URL")]
    pub garden_url: Option<String>,

    /// Metal API URL, overrides the context
    #[arg(long, global = true, env = "CLOUDCTL_METAL_URL")]
    pub metal_url: Option<String>,

    /// Bearer token for both APIs, overrides the context
    #[arg(long, global = true, env = "CLOUDCTL_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Connection settings given on the command line or through the environment
    pub fn overrides(&self) -> Overrides {
        Overrides {
            context: self.context.clone(),
            garden_url: self.garden_url.clone(),
            metal_url: self.metal_url.clone(),
            api_token: self.api_token.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage clusters
    Cluster(ClusterArgs),

    /// Manage contexts
    Context(ContextArgs),
}

#[derive(Parser, Debug)]
pub struct ClusterArgs {
    #[command(subcommand)]
    pub action: ClusterAction,
}

#[derive(Subcommand, Debug)]
pub enum ClusterAction {
    /// Create a cluster
    Create(CreateArgs),

    /// List clusters
    #[command(visible_alias = "ls")]
    List,

    /// Delete a cluster
    #[command(visible_alias = "rm")]
    Delete {
        /// Cluster id
        #[arg(value_name = "ID")]
        ids: Vec<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Describe a cluster
    Describe {
        /// Cluster id
        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },

    /// Get cluster credentials
    Credentials {
        /// Cluster id
        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },

    /// Get possible cluster inputs like kubernetes versions and partitions
    Inputs,
}

/// Arguments for cluster creation
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Name of the cluster, max 10 characters
    #[arg(long)]
    pub name: String,

    /// Description of the cluster
    #[arg(long)]
    pub description: String,

    /// Purpose of the cluster, can be one of production|dev|eval
    #[arg(long, default_value = "production")]
    pub purpose: Purpose,

    /// Owner of the cluster
    #[arg(long)]
    pub owner: String,

    /// Project the cluster belongs to
    #[arg(long)]
    pub project: String,

    /// Partition of the cluster
    #[arg(long)]
    pub partition: String,

    /// Kubernetes version of the cluster
    #[arg(long, default_value = DEFAULT_KUBERNETES_VERSION)]
    pub version: String,

    /// Minimal workers of the cluster
    #[arg(long = "minsize", default_value = "1")]
    pub min_size: u32,

    /// Maximal workers of the cluster
    #[arg(long = "maxsize", default_value = "1")]
    pub max_size: u32,

    /// Max number of workers created during an update of the cluster
    #[arg(long = "maxsurge", default_value = "1")]
    pub max_surge: u32,

    /// Max number of workers that can be unavailable during an update of the cluster
    #[arg(long = "maxunavailable", default_value = "1")]
    pub max_unavailable: u32,

    /// Labels of the cluster (key=value, comma separated)
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// External networks of the cluster, can be internet,mpls
    #[arg(long = "external-networks", value_delimiter = ',', default_value = DEFAULT_EXTERNAL_NETWORK)]
    pub external_networks: Vec<String>,

    /// Allow privileged containers in the cluster
    #[arg(long = "allowprivileged")]
    pub allow_privileged: bool,
}

/// Arguments for the context command
#[derive(Parser, Debug)]
pub struct ContextArgs {
    #[command(subcommand)]
    pub action: ContextAction,
}

#[derive(Subcommand, Debug)]
pub enum ContextAction {
    /// List all contexts
    List,

    /// Show current context
    Current,

    /// Switch to a context
    Use {
        /// Context name
        name: String,
    },

    /// Add a new context
    Add {
        /// Context name
        name: String,

        /// Garden API URL
        #[arg(long = "garden")]
        garden: String,

        /// Metal API URL
        #[arg(long = "metal")]
        metal: String,

        /// Bearer token for both APIs
        #[arg(long = "token")]
        token: Option<String>,

        /// Free text description
        #[arg(long = "desc")]
        desc: Option<String>,
    },

    /// Delete a context
    Delete {
        /// Context name
        name: String,
    },
}
