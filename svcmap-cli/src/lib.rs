//! Command-line client for the svcmap metadata API
//!
//! Commands:
//! - `svcmap pod <node> <namespace> <pod>` - tags of one pod
//! - `svcmap node <node>` - tags of every pod on a node
//! - `svcmap all` - service map of the whole cluster
//!
//! This module decodes response bodies and renders them as text.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;
use svcmap::metadata::{NodeBundle, NodeEntry, TagSet};

/// Decoded body of `GET /api/v1/metadata`
#[derive(Debug, Default)]
pub struct ClusterView {
    pub nodes: BTreeMap<String, NodeEntry>,
    pub error: Option<String>,
}

pub fn parse_tags(body: &str) -> Result<TagSet> {
    serde_json::from_str(body).context("Invalid tag list in response")
}

pub fn parse_node_bundle(body: &str) -> Result<NodeBundle> {
    serde_json::from_str(body).context("Invalid node bundle in response")
}

pub fn parse_cluster(body: &str) -> Result<ClusterView> {
    let mut object: BTreeMap<String, Value> =
        serde_json::from_str(body).context("Invalid cluster map in response")?;

    let error = match object.remove("Error") {
        Some(Value::String(message)) => Some(message),
        Some(other) => Some(other.to_string()),
        None => None,
    };

    let nodes: BTreeMap<String, NodeEntry> = object
        .into_iter()
        .map(|(node, value)| {
            serde_json::from_value(value)
                .with_context(|| format!("Invalid entry for node {}", node))
                .map(|entry| (node, entry))
        })
        .collect::<Result<_>>()?;

    Ok(ClusterView { nodes, error })
}

pub fn render_tags(tags: &TagSet) -> String {
    let mut out = String::new();
    for tag in tags {
        let _ = writeln!(out, "{}", tag);
    }
    out
}

pub fn render_node_bundle(bundle: &NodeBundle) -> String {
    if bundle.is_empty() {
        return "No pods with metadata on this node.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<40} {}", "POD", "TAGS");
    let _ = writeln!(out, "{}", "-".repeat(80));
    for (pod, tags) in bundle.pods() {
        let _ = writeln!(out, "{:<40} {}", truncate(pod, 40), tags.join(", "));
    }
    out
}

pub fn render_cluster(view: &ClusterView) -> String {
    let mut out = String::new();

    for (node, entry) in &view.nodes {
        let _ = writeln!(out, "Node: {}", node);
        match entry {
            NodeEntry::Bundle(bundle) => {
                for line in render_node_bundle(bundle).lines() {
                    let _ = writeln!(out, "  {}", line);
                }
            }
            NodeEntry::Missing { error } => {
                let _ = writeln!(out, "  error: {}", error);
            }
        }
        out.push('\n');
    }

    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {}", error);
    }
    out
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
