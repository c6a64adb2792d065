use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_mutation, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users")]
    List {
        #[arg(long, help = "Page size")]
        limit: Option<u64>,
        #[arg(long, default_value_t = 0, help = "Users to skip")]
        offset: u64,
    },

    #[command(about = "Show the authenticated user")]
    Me,

    #[command(about = "Show a user and its group memberships")]
    Get {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Create a local user")]
    Create {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "JCR_NEW_USER_PASSWORD", hide_env_values = true, help = "Initial password")]
        new_password: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long, help = "Create the account deactivated")]
        inactive: bool,
    },

    #[command(about = "Delete a user")]
    Delete {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "List the groups a user belongs to")]
    Groups {
        #[arg(help = "Username")]
        username: String,
    },
}

pub async fn handle(cmd: UserCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::List { limit, offset } => {
            let mut query = vec![("offset", offset.to_string())];
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            output_value(&output_format, &client.get_with_query("/users", &query).await?)
        }
        UserCommands::Me => output_value(&output_format, &client.get("/users/me").await?),
        UserCommands::Get { username } => {
            output_value(&output_format, &client.get(&format!("/users/{}", username)).await?)
        }
        UserCommands::Create { username, new_password, email, first_name, last_name, inactive } => {
            let body = json!({
                "username": username,
                "password": new_password,
                "email": email,
                "firstName": first_name,
                "lastName": last_name,
                "active": !inactive,
            });
            let response = client.post("/users", &body).await?;
            output_mutation(&output_format, &format!("User '{}' created", username), response)
        }
        UserCommands::Delete { username } => {
            let response = client.delete(&format!("/users/{}", username)).await?;
            output_mutation(&output_format, &format!("User '{}' deleted", username), response)
        }
        UserCommands::Groups { username } => {
            output_value(&output_format, &client.get(&format!("/users/{}/groups", username)).await?)
        }
    }
}
