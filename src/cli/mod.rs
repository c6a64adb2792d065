pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use self::client::ApiClient;
use self::config::Connection;

#[derive(Parser)]
#[command(name = "jcr")]
#[command(about = "JCR CLI - Command-line interface for the content repository REST API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Output in YAML format")]
    pub yaml: bool,

    #[arg(long, short = 's', global = true, env = "JCR_SERVER", help = "Server name or base URL")]
    pub server: Option<String>,

    #[arg(long, short = 'u', global = true, env = "JCR_USER", help = "Username for Basic authentication")]
    pub user: Option<String>,

    #[arg(long, short = 'p', global = true, env = "JCR_PASSWORD", hide_env_values = true, help = "Password for Basic authentication")]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Remote server registry and instance information")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Read and write repository nodes")]
    Node {
        #[command(subcommand)]
        cmd: commands::node::NodeCommands,
    },

    #[command(about = "Read and write single properties")]
    Property {
        #[command(subcommand)]
        cmd: commands::property::PropertyCommands,
    },

    #[command(about = "Run an XPath or SQL query")]
    Query(commands::query::QueryArgs),

    #[command(about = "User management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Group management")]
    Group {
        #[command(subcommand)]
        cmd: commands::group::GroupCommands,
    },

    #[command(about = "System introspection")]
    System {
        #[command(subcommand)]
        cmd: commands::system::SystemCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else if cli.yaml {
            OutputFormat::Yaml
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let saved = config::load_config()?;
    let connection = Connection::resolve(&saved, cli.server, cli.user, cli.password);

    tracing::debug!("Using server {}", connection.url);
    let client = ApiClient::new(connection.clone())?;

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, &client, &connection, output_format).await,
        Commands::Node { cmd } => commands::node::handle(cmd, &client, output_format).await,
        Commands::Property { cmd } => commands::property::handle(cmd, &client, output_format).await,
        Commands::Query(args) => commands::query::handle(args, &client, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &client, output_format).await,
        Commands::Group { cmd } => commands::group::handle(cmd, &client, output_format).await,
        Commands::System { cmd } => commands::system::handle(cmd, &client, output_format).await,
    }
}
