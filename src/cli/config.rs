use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub url: String,
    pub description: String,
    pub added_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

/// Everything the CLI remembers between runs, stored as `config.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub servers: HashMap<String, ServerInfo>,
    pub current_server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ServerInfo {
    pub fn new(url: String, description: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            description,
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

impl CliConfig {
    pub fn current_server_info(&self) -> Option<&ServerInfo> {
        self.current_server
            .as_ref()
            .and_then(|name| self.servers.get(name))
    }
}

/// Connection settings after flags, environment and saved config are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Connection {
    /// Flags win over the saved config; the saved current server wins over the default URL
    pub fn resolve(
        config: &CliConfig,
        server: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        let url = server
            .map(|s| match config.servers.get(&s) {
                Some(info) => info.url.clone(),
                None => s,
            })
            .or_else(|| config.current_server_info().map(|info| info.url.clone()))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        Self {
            url: url.trim_end_matches('/').to_string(),
            username: username.or_else(|| config.username.clone()),
            password: password.or_else(|| config.password.clone()),
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("JCR_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("jcr").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_config() -> anyhow::Result<CliConfig> {
    let config_file = get_config_dir()?.join("config.json");
    if !config_file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(config_file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let config_file = get_config_dir()?.join("config.json");
    fs::write(config_file, serde_json::to_string_pretty(config)?)?;
    Ok(())
}

pub async fn ping_server(url: &str) -> ServerStatus {
    let client = reqwest::Client::new();
    let url = format!("{}/health", url.trim_end_matches('/'));

    match client.get(&url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}
