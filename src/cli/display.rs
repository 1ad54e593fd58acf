//! Display formatting for CLI output
//!
//! SBIO pattern: Pure functions that format data for display

use clap::ValueEnum;
use serde::Serialize;

use super::commands::{CommandResult, ContextInfo};
use crate::cluster::Cluster;

/// How records are rendered on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Yaml,
    Json,
}

// ============================================================================
// Table formatting helpers
// ============================================================================

/// Format a simple table with headers and rows
pub fn format_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "No resources found.\n".to_string();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let mut output = String::new();

    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            output.push_str("   ");
        }
        output.push_str(&format!(
            "{:width$}",
            header.to_uppercase(),
            width = widths[i]
        ));
    }
    output.push('\n');

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                output.push_str("   ");
            }
            if i < widths.len() {
                output.push_str(&format!("{:width$}", cell, width = widths[i]));
            } else {
                output.push_str(cell);
            }
        }
        output.push('\n');
    }

    output
}

/// Render any document as YAML
pub fn to_yaml<T: Serialize>(value: &T) -> CommandResult<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Render any document as pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> CommandResult<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

// ============================================================================
// Cluster display
// ============================================================================

fn cluster_row(cluster: &Cluster) -> Vec<String> {
    let spec = &cluster.spec;
    vec![
        cluster.metadata.uid.clone(),
        cluster.metadata.name.clone(),
        spec.kubernetes.version.clone(),
        spec.partition().unwrap_or("").to_string(),
        spec.purpose.map(|p| p.to_string()).unwrap_or_default(),
        cluster.state(),
        cluster
            .metadata
            .creation_timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
    ]
}

const CLUSTER_HEADERS: &[&str] = &[
    "UID", "NAME", "VERSION", "PARTITION", "PURPOSE", "STATE", "CREATED",
];

/// Format cluster list for display
pub fn format_cluster_list(clusters: &[Cluster]) -> String {
    format_table(CLUSTER_HEADERS, clusters.iter().map(cluster_row).collect())
}

/// Render one cluster in the requested format
pub fn render_cluster(cluster: &Cluster, format: OutputFormat) -> CommandResult<String> {
    match format {
        OutputFormat::Table => Ok(format_cluster_list(std::slice::from_ref(cluster))),
        OutputFormat::Yaml => to_yaml(cluster),
        OutputFormat::Json => to_json(cluster),
    }
}

/// Render a list of clusters in the requested format
pub fn render_clusters(clusters: &[Cluster], format: OutputFormat) -> CommandResult<String> {
    match format {
        OutputFormat::Table => Ok(format_cluster_list(clusters)),
        OutputFormat::Yaml => to_yaml(&clusters),
        OutputFormat::Json => to_json(&clusters),
    }
}

// ============================================================================
// Context display
// ============================================================================

/// Format context list for display
pub fn format_context_list(contexts: &[ContextInfo]) -> String {
    let headers = &["", "NAME", "GARDEN", "METAL"];
    let rows: Vec<Vec<String>> = contexts
        .iter()
        .map(|ctx| {
            vec![
                if ctx.is_current { "*" } else { " " }.to_string(),
                ctx.name.clone(),
                ctx.garden_url.clone(),
                ctx.metal_url.clone(),
            ]
        })
        .collect();

    format_table(headers, rows)
}

/// Format current context for display
pub fn format_current_context(name: &str, garden_url: &str) -> String {
    format!("Current context: {} ({})\n", name, garden_url)
}
