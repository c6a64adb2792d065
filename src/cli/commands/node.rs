use clap::Subcommand;

use crate::cli::client::{resource_path, ApiClient};
use crate::cli::utils::{output_mutation, output_value, read_stdin_json};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum NodeCommands {
    #[command(about = "Show a node, optionally with children")]
    Get {
        #[arg(default_value = "/", help = "Node path")]
        path: String,
        #[arg(long, short = 'd', help = "Levels of children to include")]
        depth: Option<u32>,
    },

    #[command(about = "Create a node (JSON from stdin) below a parent")]
    Create {
        #[arg(help = "Parent node path")]
        parent: String,
    },

    #[command(about = "Replace a node's content with JSON from stdin")]
    Update {
        #[arg(help = "Node path")]
        path: String,
    },

    #[command(about = "Delete a node and its subtree")]
    Delete {
        #[arg(help = "Node path")]
        path: String,
    },
}

pub async fn handle(cmd: NodeCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        NodeCommands::Get { path, depth } => {
            let query: Vec<(&str, String)> = depth.map(|d| ("depth", d.to_string())).into_iter().collect();
            let node = client.get_with_query(&resource_path("/nodes", &path), &query).await?;
            output_value(&output_format, &node)
        }
        NodeCommands::Create { parent } => {
            let body = read_stdin_json()?;
            let response = client.post(&resource_path("/nodes", &parent), &body).await?;
            output_mutation(&output_format, "Node created", response)
        }
        NodeCommands::Update { path } => {
            let body = read_stdin_json()?;
            let response = client.put(&resource_path("/nodes", &path), &body).await?;
            output_mutation(&output_format, &format!("Node {} updated", path), response)
        }
        NodeCommands::Delete { path } => {
            let response = client.delete(&resource_path("/nodes", &path)).await?;
            output_mutation(&output_format, &format!("Node {} deleted", path), response)
        }
    }
}
