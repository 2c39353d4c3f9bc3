//! svcmap CLI - query the Kubernetes service map
//!
//! Commands:
//! - `svcmap pod` - tags of one pod
//! - `svcmap node` - tags of every pod on a node
//! - `svcmap all` - service map of the whole cluster

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use svcmap_cli::{
    parse_cluster, parse_node_bundle, parse_tags, render_cluster, render_node_bundle,
    render_tags,
};

#[derive(Parser)]
#[command(name = "svcmap")]
#[command(about = "Query the Kubernetes service map served by svcmap-server", long_about = None)]
#[command(version)]
struct Cli {
    /// Server address (host:port)
    #[arg(
        short,
        long,
        env = "SVCMAP_SERVER",
        default_value = "localhost:5005",
        global = true
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tags of one pod
    Pod {
        /// Node the pod runs on
        node: String,
        /// Namespace of the pod
        namespace: String,
        /// Pod name
        pod: String,
    },
    /// Show the tags of every pod on a node
    Node {
        /// Node name
        node: String,
    },
    /// Show the service map of every node in the cluster
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let base = format!("http://{}/api/v1/metadata", cli.server);
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Pod {
            node,
            namespace,
            pod,
        } => {
            let url = format!("{}/{}/{}/{}", base, node, namespace, pod);
            get_pod(&client, &url).await?;
        }
        Commands::Node { node } => {
            let url = format!("{}/{}", base, node);
            get_node(&client, &url, &node).await?;
        }
        Commands::All => {
            get_all(&client, &base).await?;
        }
    }

    Ok(())
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<(StatusCode, String)> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    Ok((status, body))
}

async fn get_pod(client: &reqwest::Client, url: &str) -> Result<()> {
    let (status, body) = fetch(client, url).await?;

    match status {
        StatusCode::OK => print!("{}", render_tags(&parse_tags(&body)?)),
        StatusCode::NOT_FOUND => println!("{}", body.trim()),
        _ => bail!("Server returned {}: {}", status, body.trim()),
    }

    Ok(())
}

async fn get_node(client: &reqwest::Client, url: &str, node: &str) -> Result<()> {
    let (status, body) = fetch(client, url).await?;

    match status {
        StatusCode::OK => print!("{}", render_node_bundle(&parse_node_bundle(&body)?)),
        StatusCode::NOT_FOUND => println!("No metadata found for node {}.", node),
        _ => bail!("Server returned {}: {}", status, body.trim()),
    }

    Ok(())
}

async fn get_all(client: &reqwest::Client, url: &str) -> Result<()> {
    let (status, body) = fetch(client, url).await?;

    match status {
        StatusCode::OK => print!("{}", render_cluster(&parse_cluster(&body)?)),
        StatusCode::SERVICE_UNAVAILABLE => {
            eprintln!("Warning: the cluster API could not be fully queried, showing partial results");
            print!("{}", render_cluster(&parse_cluster(&body)?));
            std::process::exit(2);
        }
        StatusCode::NOT_FOUND => println!("No metadata found."),
        _ => bail!("Server returned {}: {}", status, body.trim()),
    }

    Ok(())
}
