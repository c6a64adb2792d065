use clap::Args;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct QueryArgs {
    #[arg(help = "Query statement")]
    pub statement: String,

    #[arg(long, short = 'l', default_value = "xpath", help = "xpath, sql or JCR-SQL2")]
    pub language: String,

    #[arg(long, help = "Maximum number of hits returned")]
    pub limit: Option<u64>,

    #[arg(long, default_value_t = 0, help = "Hits to skip")]
    pub offset: u64,
}

pub async fn handle(args: QueryArgs, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut body = json!({
        "statement": args.statement,
        "language": args.language,
        "offset": args.offset,
    });
    if let Some(limit) = args.limit {
        body["limit"] = json!(limit);
    }

    match client.post("/query", &body).await? {
        crate::cli::client::ApiResponse::Body(result) => output_value(&output_format, &result),
        other => anyhow::bail!("unexpected query response: {:?}", other),
    }
}
