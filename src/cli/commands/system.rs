use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum SystemCommands {
    #[command(about = "Process and build properties")]
    Properties,
    #[command(about = "Release and project versions")]
    Versions,
    #[command(about = "Operating system and processors")]
    Hardware,
    #[command(about = "Start time and uptime")]
    Runtime,
}

pub async fn handle(cmd: SystemCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let path = match cmd {
        SystemCommands::Properties => "/system/properties",
        SystemCommands::Versions => "/system/versions",
        SystemCommands::Hardware => "/system/hardware",
        SystemCommands::Runtime => "/system/runtime",
    };
    output_value(&output_format, &client.get(path).await?)
}
