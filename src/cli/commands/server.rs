use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{self, Connection, ServerInfo, ServerStatus};
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Register remote server")]
    Add {
        #[arg(help = "Server base URL")]
        url: String,
        #[arg(help = "Server name (defaults to the URL host)")]
        name: Option<String>,
        #[arg(long, default_value = "", help = "Free-form description")]
        description: String,
    },

    #[command(about = "List all registered servers")]
    List,

    #[command(about = "Show the server commands are sent to")]
    Current,

    #[command(about = "Switch to a registered server")]
    Use {
        #[arg(help = "Server name to switch to")]
        name: String,
    },

    #[command(about = "Remove server from registry")]
    Delete {
        #[arg(help = "Server name to delete")]
        name: String,
    },

    #[command(about = "Remember the username sent with every request")]
    Login {
        #[arg(help = "Username")]
        username: String,
    },

    #[command(about = "Health check every registered server")]
    PingAll,

    #[command(about = "Repository instance information (GET /)")]
    Info,

    #[command(about = "Liveness check (GET /health)")]
    Health,

    #[command(about = "Greeting from the server (GET /hello)")]
    Hello,
}

pub async fn handle(
    cmd: ServerCommands,
    client: &ApiClient,
    connection: &Connection,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Add { url, name, description } => {
            let name = match name {
                Some(name) => name,
                None => url::Url::parse(&url)?
                    .host_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("Cannot derive a server name from '{}'", url))?,
            };

            let mut saved = config::load_config()?;
            if saved.servers.contains_key(&name) {
                anyhow::bail!("Server '{}' already exists", name);
            }
            saved.servers.insert(name.clone(), ServerInfo::new(url, description));
            if saved.current_server.is_none() {
                saved.current_server = Some(name.clone());
            }
            config::save_config(&saved)?;
            output_success(&output_format, &format!("Added server '{}'", name), Some(json!({ "server": name })))
        }
        ServerCommands::List => {
            let saved = config::load_config()?;
            let mut names: Vec<&String> = saved.servers.keys().collect();
            names.sort();
            let servers: Vec<_> = names
                .into_iter()
                .map(|name| {
                    let info = &saved.servers[name];
                    json!({
                        "name": name,
                        "url": info.url,
                        "status": info.status,
                        "current": saved.current_server.as_deref() == Some(name.as_str()),
                    })
                })
                .collect();
            output_value(&output_format, &json!({ "servers": servers }))
        }
        ServerCommands::Current => output_value(
            &output_format,
            &json!({ "url": connection.url, "username": connection.username }),
        ),
        ServerCommands::Use { name } => {
            let mut saved = config::load_config()?;
            if !saved.servers.contains_key(&name) {
                anyhow::bail!("Server '{}' not found", name);
            }
            saved.current_server = Some(name.clone());
            config::save_config(&saved)?;
            output_success(&output_format, &format!("Switched to server '{}'", name), None)
        }
        ServerCommands::Delete { name } => {
            let mut saved = config::load_config()?;
            if saved.servers.remove(&name).is_none() {
                anyhow::bail!("Server '{}' not found", name);
            }
            if saved.current_server.as_deref() == Some(name.as_str()) {
                saved.current_server = None;
            }
            config::save_config(&saved)?;
            output_success(&output_format, &format!("Server '{}' deleted", name), None)
        }
        ServerCommands::Login { username } => {
            let mut saved = config::load_config()?;
            saved.username = Some(username.clone());
            config::save_config(&saved)?;
            output_success(&output_format, &format!("Requests will authenticate as '{}'", username), None)
        }
        ServerCommands::PingAll => {
            let mut saved = config::load_config()?;
            for (name, info) in saved.servers.iter_mut() {
                let status = config::ping_server(&info.url).await;
                if status == ServerStatus::Down {
                    tracing::warn!("Server '{}' at {} is down", name, info.url);
                }
                info.update_ping(status);
            }
            config::save_config(&saved)?;
            let statuses: serde_json::Map<_, _> = saved
                .servers
                .iter()
                .map(|(name, info)| (name.clone(), json!(info.status)))
                .collect();
            output_value(&output_format, &serde_json::Value::Object(statuses))
        }
        ServerCommands::Info => output_value(&output_format, &client.get("/").await?),
        ServerCommands::Health => output_value(&output_format, &client.get("/health").await?),
        ServerCommands::Hello => output_value(&output_format, &client.get("/hello").await?),
    }
}
