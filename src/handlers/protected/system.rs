use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::repository::names::REP_VERSION_DESC;
use crate::repository::{Credentials, Repository};
use crate::state::AppState;

use super::utils::with_session;

const UNKNOWN: &str = "unknown";

/// GET /system/properties - Process and build properties
pub async fn properties<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    with_session(&state, credentials, |_| Ok(())).await?;

    let mut info = Map::new();
    info.insert("app.environment".into(), json!(format!("{:?}", state.config.environment).to_lowercase()));
    info.insert("app.name".into(), json!(env!("CARGO_PKG_NAME")));
    info.insert("app.version".into(), json!(env!("CARGO_PKG_VERSION")));
    info.insert("os.arch".into(), json!(std::env::consts::ARCH));
    info.insert("os.family".into(), json!(std::env::consts::FAMILY));
    info.insert("os.name".into(), json!(std::env::consts::OS));
    info.insert("process.id".into(), json!(std::process::id().to_string()));
    if let Ok(dir) = std::env::current_dir() {
        info.insert("process.dir".into(), json!(dir.display().to_string()));
    }
    info.insert("server.publicUrl".into(), json!(state.config.server.public_url));
    Ok(Json(info))
}

/// GET /system/versions
pub async fn versions<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    with_session(&state, credentials, |_| Ok(())).await?;

    let release = state
        .repository
        .descriptor(REP_VERSION_DESC)
        .unwrap_or_else(|| UNKNOWN.to_string());

    let mut info = Map::new();
    info.insert("Release Version".into(), json!(release));
    info.insert("Project Version".into(), json!(project_version(&state.config)));
    Ok(Json(info))
}

/// `<version>[, build: <build>]`; a build of "-1" means no build number
pub fn project_version(config: &AppConfig) -> String {
    let version = config.repository.project_version.as_deref().unwrap_or_default();
    let build = config
        .repository
        .project_build
        .as_deref()
        .filter(|build| !build.is_empty() && *build != "-1");

    match (version.is_empty(), build) {
        (true, None) => UNKNOWN.to_string(),
        (true, Some(build)) => build.to_string(),
        (false, None) => version.to_string(),
        (false, Some(build)) => format!("{}, build: {}", version, build),
    }
}

/// GET /system/hardware
pub async fn hardware<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    with_session(&state, credentials, |_| Ok(())).await?;

    let processors = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    let mut info = Map::new();
    info.insert("OS architecture".into(), json!(std::env::consts::ARCH));
    info.insert("OS name".into(), json!(std::env::consts::OS));
    info.insert("Processors".into(), json!(format!("# {}", processors)));
    Ok(Json(info))
}

/// GET /system/runtime - Start time and uptime of this server process
pub async fn runtime<R: Repository>(
    State(state): State<AppState<R>>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    with_session(&state, credentials, |_| Ok(())).await?;

    let uptime = Utc::now().signed_duration_since(state.started_at);
    let mut info = Map::new();
    info.insert("Started".into(), json!(state.started_at.to_rfc3339()));
    info.insert("Uptime".into(), json!(format_uptime(uptime.num_seconds())));
    info.insert("Uptime seconds".into(), json!(uptime.num_seconds()));
    info.insert("Process id".into(), json!(std::process::id()));
    Ok(Json(info))
}

fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (days, rest) = (seconds / 86_400, seconds % 86_400);
    let (hours, rest) = (rest / 3_600, rest % 3_600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}
