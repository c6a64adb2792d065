use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_mutation, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum GroupCommands {
    #[command(about = "List groups")]
    List {
        #[arg(long, help = "Page size")]
        limit: Option<u64>,
        #[arg(long, default_value_t = 0, help = "Groups to skip")]
        offset: u64,
    },

    #[command(about = "Show a group")]
    Get {
        #[arg(help = "Group name")]
        name: String,
    },

    #[command(about = "Create a local group")]
    Create {
        #[arg(help = "Group name")]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "member", help = "Member username, repeatable")]
        members: Vec<String>,
    },

    #[command(about = "Delete a group")]
    Delete {
        #[arg(help = "Group name")]
        name: String,
    },
}

pub async fn handle(cmd: GroupCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        GroupCommands::List { limit, offset } => {
            let mut query = vec![("offset", offset.to_string())];
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            output_value(&output_format, &client.get_with_query("/groups", &query).await?)
        }
        GroupCommands::Get { name } => {
            output_value(&output_format, &client.get(&format!("/groups/{}", name)).await?)
        }
        GroupCommands::Create { name, description, members } => {
            let body = json!({
                "name": name,
                "description": description,
                "members": members,
            });
            let response = client.post("/groups", &body).await?;
            output_mutation(&output_format, &format!("Group '{}' created", name), response)
        }
        GroupCommands::Delete { name } => {
            let response = client.delete(&format!("/groups/{}", name)).await?;
            output_mutation(&output_format, &format!("Group '{}' deleted", name), response)
        }
    }
}
