use std::path::Path;
use std::process;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cloudctl::cli::{
    cluster_create, cluster_credentials, cluster_delete, cluster_describe, cluster_inputs,
    cluster_list, context_add, context_current, context_delete, context_list, context_use,
    format_context_list, format_current_context, render_cluster, render_clusters, to_yaml,
    AssumeYes, Cli, ClusterAction, Commands, Confirm, ContextAction, LinePrompt, OutputFormat,
};
use cloudctl::client::{GardenClient, MetalClient};
use cloudctl::context::{
    default_config_path, expand_path, load_config_from, resolve_endpoints, save_config_to,
    Overrides,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries YAML and kubeconfigs, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match &cli.config {
        Some(path) => expand_path(path)?,
        None => default_config_path(),
    };
    debug!("Using config {}", config_path.display());

    let overrides = cli.overrides();
    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Context(args) => run_context(args.action, &config_path),
        Commands::Cluster(args) => {
            run_cluster(args.action, &config_path, &overrides, timeout, cli.output).await
        }
    }
}

async fn run_cluster(
    action: ClusterAction,
    config_path: &Path,
    overrides: &Overrides,
    timeout: Duration,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let config = load_config_from(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let endpoints = resolve_endpoints(&config, overrides)?;

    let garden = GardenClient::new(&endpoints.garden_url, endpoints.api_token.clone(), timeout)?;

    match action {
        ClusterAction::Create(args) => {
            let metal = MetalClient::new(&endpoints.metal_url, endpoints.api_token, timeout)?;
            let params = args.into_params()?;
            let cluster = cluster_create(&metal, &garden, params).await?;
            print!("{}", render_cluster(&cluster, output)?);
        }
        ClusterAction::List => {
            let clusters = cluster_list(&garden).await?;
            print!("{}", render_clusters(&clusters, output)?);
        }
        ClusterAction::Delete { ids, yes } => {
            let confirm: Box<dyn Confirm> = if yes {
                Box::new(AssumeYes::stdout())
            } else {
                Box::new(LinePrompt::stdio())
            };
            match cluster_delete(&garden, confirm.as_ref(), &ids, output).await? {
                Some(cluster) => print!("{}", render_cluster(&cluster, output)?),
                None => println!("Aborted."),
            }
        }
        ClusterAction::Describe { ids } => {
            let cluster = cluster_describe(&garden, &ids).await?;
            print!("{}", to_yaml(&cluster)?);
        }
        ClusterAction::Credentials { ids } => {
            let credentials = cluster_credentials(&garden, &ids).await?;
            println!("{}", credentials.kubeconfig);
        }
        ClusterAction::Inputs => {
            let constraints = cluster_inputs(&garden).await?;
            print!("{}", to_yaml(&constraints)?);
        }
    }

    Ok(())
}

fn run_context(action: ContextAction, config_path: &Path) -> anyhow::Result<()> {
    let mut config = load_config_from(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;

    match action {
        ContextAction::List => {
            print!("{}", format_context_list(&context_list(&config)));
            return Ok(());
        }
        ContextAction::Current => {
            let ctx = context_current(&config)?;
            print!("{}", format_current_context(&ctx.name, &ctx.garden_url));
            return Ok(());
        }
        ContextAction::Use { name } => {
            context_use(&mut config, &name)?;
            println!("Switched to context \"{}\".", name);
        }
        ContextAction::Add {
            name,
            garden,
            metal,
            token,
            desc,
        } => {
            context_add(
                &mut config,
                &name,
                &garden,
                &metal,
                token.as_deref(),
                desc.as_deref(),
            )?;
            println!("Context \"{}\" added.", name);
        }
        ContextAction::Delete { name } => {
            if context_delete(&mut config, &name)? {
                println!("Context \"{}\" deleted.", name);
            } else {
                println!("Context \"{}\" not found.", name);
                return Ok(());
            }
        }
    }

    save_config_to(&config, config_path)
        .with_context(|| format!("failed to write config {}", config_path.display()))?;
    Ok(())
}
