use jcr_rest_api::config::{self, AppConfig};
use jcr_rest_api::repository::memory::MemoryRepository;
use jcr_rest_api::repository::names::{CLUSTER_ID_DESC, REP_NAME_DESC, REP_VENDOR_DESC};
use jcr_rest_api::repository::Credentials;
use jcr_rest_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up APP_ENV, JCR_API_PORT, SECURITY_*, etc.
    let _ = dotenvy::dotenv();

    let default_filter = if jcr_rest_api::is_development!() {
        "jcr_rest_api=debug,tower_http=debug"
    } else {
        "jcr_rest_api=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting JCR REST API in {:?} mode", config.environment);

    let repository = build_repository(config)?;
    let app = jcr_rest_api::app(AppState::new(repository, config.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("JCR REST API listening on http://{} ({})", bind_addr, config.server.public_url);

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_repository(config: &AppConfig) -> anyhow::Result<MemoryRepository> {
    let mut repository = MemoryRepository::new()
        .with_descriptor(REP_NAME_DESC, config.repository.name.clone())
        .with_descriptor(REP_VENDOR_DESC, config.repository.vendor.clone());
    if let Some(cluster_id) = &config.repository.cluster_id {
        repository = repository.with_descriptor(CLUSTER_ID_DESC, cluster_id.clone());
    }

    let admin = Credentials::new(
        config.security.admin_username.clone(),
        config.security.admin_password.clone(),
    );
    repository.bootstrap(&admin)?;
    tracing::info!("Bootstrapped repository with admin user '{}'", admin.username);
    Ok(repository)
}
