use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::repository::Repository;

/// Shared handler state: the repository plus the configuration it was started with
pub struct AppState<R> {
    pub repository: Arc<R>,
    pub config: Arc<AppConfig>,
    pub started_at: DateTime<Utc>,
}

impl<R: Repository> AppState<R> {
    pub fn new(repository: R, config: AppConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }
}

impl<R> AppState<R> {
    /// Absolute URL for a path below the API root
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.server.public_url.trim_end_matches('/'), path)
    }
}

// Manual impl so `R` itself does not need to be `Clone`
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            config: self.config.clone(),
            started_at: self.started_at,
        }
    }
}
