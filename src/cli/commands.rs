//! Command implementations for the CLI
//!
//! SBIO pattern: Commands return Results, I/O is handled by caller. Remote
//! services come in as trait objects so every flow runs against mocks too.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::display::{render_cluster, OutputFormat};
use super::prompt::Confirm;
use super::CreateArgs;
use crate::client::{ClientError, GardenClientTrait, MetalClientTrait};
use crate::cluster::{
    parse_labels, AcquiredNetwork, BuildError, Cluster, ClusterRequestParams, Constraints,
    Credentials, SpecificationBuilder,
};
use crate::context::{self, Config, Context, ContextError};

/// Question asked before a cluster is deleted
pub const DELETE_QUESTION: &str = "Press Enter to delete above cluster.";

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for commands
pub type CommandResult<T> = Result<T, CommandError>;

/// Pick the single cluster id out of the positional arguments.
pub fn cluster_id<'a>(verb: &str, args: &'a [String]) -> CommandResult<&'a str> {
    match args {
        [] => Err(CommandError::Usage(format!(
            "cluster {} requires clusterID as argument",
            verb
        ))),
        [id] => Ok(id.as_str()),
        _ => Err(CommandError::Usage(format!(
            "cluster {} requires exactly one clusterID as argument",
            verb
        ))),
    }
}

impl CreateArgs {
    /// Turn parsed flags into request parameters
    pub fn into_params(self) -> CommandResult<ClusterRequestParams> {
        Ok(ClusterRequestParams {
            labels: parse_labels(&self.labels)?,
            name: self.name,
            description: self.description,
            purpose: self.purpose,
            owner: self.owner,
            project: self.project,
            partition: self.partition,
            version: self.version,
            min_size: self.min_size,
            max_size: self.max_size,
            max_surge: self.max_surge,
            max_unavailable: self.max_unavailable,
            external_networks: self.external_networks,
            allow_privileged: self.allow_privileged,
        })
    }
}

// ============================================================================
// Cluster Commands
// ============================================================================

/// Acquire a node network and create a cluster on it.
///
/// Parameters and partition defaults are checked before any remote call.
/// Once a network is acquired, any later failure releases it again.
pub async fn cluster_create(
    metal: &dyn MetalClientTrait,
    garden: &dyn GardenClientTrait,
    params: ClusterRequestParams,
) -> CommandResult<Cluster> {
    let builder = SpecificationBuilder::new(params)?;
    let request = builder.network_request();

    info!(
        "Acquiring node network for {} in partition {} (project {})",
        request.name, request.partition_id, request.project_id
    );
    let result = metal.acquire_network(&request).await?;
    let network_id = result.network.id.clone();

    let network = match AcquiredNetwork::try_from(result) {
        Ok(network) => network,
        Err(e) => {
            warn!("Network {} is unusable: {:?}", network_id, e);
            release_network(metal, &network_id).await;
            return Err(e.into());
        }
    };
    info!("Acquired node network {} ({})", network.id, network.prefix);

    let spec = builder.build(&network);
    debug!("Cluster specification: {:?}", spec);

    match garden.create(&spec).await {
        Ok(cluster) => {
            info!("Created cluster {} ({})", cluster.metadata.name, cluster.metadata.uid);
            Ok(cluster)
        }
        Err(e) => {
            warn!("Cluster creation failed: {}", e);
            release_network(metal, &network.id).await;
            Err(e.into())
        }
    }
}

/// Best effort, the original error is what the caller gets
async fn release_network(metal: &dyn MetalClientTrait, id: &str) {
    if id.is_empty() {
        warn!("Acquired node network has no id and cannot be released, release it manually");
        return;
    }
    match metal.release_network(id).await {
        Ok(_) => info!("Released node network {}", id),
        Err(e) => warn!("Failed to release node network {}, release it manually: {}", id, e),
    }
}

/// List all clusters visible to the caller
pub async fn cluster_list(garden: &dyn GardenClientTrait) -> CommandResult<Vec<Cluster>> {
    Ok(garden.list().await?)
}

/// Fetch a single cluster
pub async fn cluster_describe(
    garden: &dyn GardenClientTrait,
    args: &[String],
) -> CommandResult<Cluster> {
    let id = cluster_id("describe", args)?;
    Ok(garden.get(id).await?)
}

/// Fetch the kubeconfig of a cluster
pub async fn cluster_credentials(
    garden: &dyn GardenClientTrait,
    args: &[String],
) -> CommandResult<Credentials> {
    let id = cluster_id("credentials", args)?;
    Ok(garden.credentials(id).await?)
}

/// Kubernetes versions and partitions the garden service accepts
pub async fn cluster_inputs(garden: &dyn GardenClientTrait) -> CommandResult<Constraints> {
    Ok(garden.constraints().await?)
}

/// Show a cluster, ask for confirmation, then delete it.
///
/// Returns `None` when the user declined; nothing was deleted then.
pub async fn cluster_delete(
    garden: &dyn GardenClientTrait,
    confirm: &dyn Confirm,
    args: &[String],
    format: OutputFormat,
) -> CommandResult<Option<Cluster>> {
    let id = cluster_id("delete", args)?;
    let cluster = garden.get(id).await?;

    let rendered = render_cluster(&cluster, format)?;
    if !confirm.confirm(&rendered, DELETE_QUESTION)? {
        info!("Deletion of cluster {} aborted", id);
        return Ok(None);
    }

    let deleted = garden.delete(id).await?;
    info!("Deleted cluster {}", id);
    Ok(Some(deleted))
}

// ============================================================================
// Context Commands (Pure business logic)
// ============================================================================

/// Info about a context for display
#[derive(Debug, Clone)]
pub struct ContextInfo {
    pub name: String,
    pub garden_url: String,
    pub metal_url: String,
    pub is_current: bool,
}

/// List all contexts
pub fn context_list(config: &Config) -> Vec<ContextInfo> {
    let current = config.current_context.as_deref();
    let mut contexts: Vec<_> = config
        .contexts
        .iter()
        .map(|(name, ctx)| ContextInfo {
            name: name.clone(),
            garden_url: ctx.garden_url.clone(),
            metal_url: ctx.metal_url.clone(),
            is_current: Some(name.as_str()) == current,
        })
        .collect();

    contexts.sort_by(|a, b| a.name.cmp(&b.name));
    contexts
}

/// Get current context
pub fn context_current(config: &Config) -> CommandResult<&Context> {
    let name = config
        .current_context
        .as_deref()
        .ok_or(ContextError::NoCurrentContext)?;
    Ok(context::get_context(config, name)?)
}

/// Switch to a context
pub fn context_use(config: &mut Config, name: &str) -> CommandResult<()> {
    context::set_current_context(config, name)?;
    Ok(())
}

/// Add a new context, the first one added becomes current
pub fn context_add(
    config: &mut Config,
    name: &str,
    garden_url: &str,
    metal_url: &str,
    api_token: Option<&str>,
    description: Option<&str>,
) -> CommandResult<()> {
    let mut ctx = Context::new(name, garden_url, metal_url);
    if let Some(token) = api_token {
        ctx = ctx.with_api_token(token);
    }
    if let Some(desc) = description {
        ctx = ctx.with_description(desc);
    }
    context::add_context(config, ctx);
    if config.current_context.is_none() {
        context::set_current_context(config, name)?;
    }
    Ok(())
}

/// Delete a context
pub fn context_delete(config: &mut Config, name: &str) -> CommandResult<bool> {
    let removed = context::remove_context(config, name);
    Ok(removed.is_some())
}
