use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::client::{resource_path, ApiClient};
use crate::cli::utils::{output_mutation, output_value};
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct PropertyValues {
    #[arg(long = "type", short = 't', default_value = "String", help = "Property type name")]
    pub property_type: String,

    #[arg(long, short = 'm', help = "Store the values as a multi-valued property")]
    pub multiple: bool,

    #[arg(help = "Value(s); binaries are base64")]
    pub values: Vec<String>,
}

impl PropertyValues {
    fn to_body(&self, name: &str) -> anyhow::Result<serde_json::Value> {
        if !self.multiple && self.values.len() != 1 {
            anyhow::bail!("a single-valued property takes exactly one value, use --multiple for more");
        }
        Ok(json!({
            "name": name,
            "type": self.property_type,
            "multiple": self.multiple,
            "values": self.values,
        }))
    }
}

#[derive(Subcommand)]
pub enum PropertyCommands {
    #[command(about = "Show a property")]
    Get {
        #[arg(help = "Property path")]
        path: String,
    },

    #[command(about = "Add a property to a node")]
    Create {
        #[arg(help = "Node path")]
        node: String,
        #[arg(help = "Property name")]
        name: String,
        #[command(flatten)]
        values: PropertyValues,
    },

    #[command(about = "Overwrite a property's values")]
    Update {
        #[arg(help = "Property path")]
        path: String,
        #[command(flatten)]
        values: PropertyValues,
    },

    #[command(about = "Delete a property")]
    Delete {
        #[arg(help = "Property path")]
        path: String,
    },
}

pub async fn handle(cmd: PropertyCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PropertyCommands::Get { path } => {
            let property = client.get(&resource_path("/properties", &path)).await?;
            output_value(&output_format, &property)
        }
        PropertyCommands::Create { node, name, values } => {
            let body = values.to_body(&name)?;
            let response = client.post(&resource_path("/properties", &node), &body).await?;
            output_mutation(&output_format, "Property created", response)
        }
        PropertyCommands::Update { path, values } => {
            let name = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_string();
            let body = values.to_body(&name)?;
            let response = client.put(&resource_path("/properties", &path), &body).await?;
            output_mutation(&output_format, &format!("Property {} updated", path), response)
        }
        PropertyCommands::Delete { path } => {
            let response = client.delete(&resource_path("/properties", &path)).await?;
            output_mutation(&output_format, &format!("Property {} deleted", path), response)
        }
    }
}
