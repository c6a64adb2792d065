use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub repository: RepositoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Base URL used for `Location` headers and hypermedia links
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_depth: u32,
    pub max_depth: u32,
    pub query_default_limit: u64,
    pub page_default_limit: u64,
    pub page_max_limit: u64,
    pub enable_request_logging: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub realm: String,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    pub vendor: String,
    pub cluster_id: Option<String>,
    pub project_version: Option<String>,
    pub project_build: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("JCR_API_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_PUBLIC_URL") {
            self.server.public_url = v.trim_end_matches('/').to_string();
        }

        // API overrides
        if let Ok(v) = env::var("API_DEFAULT_DEPTH") {
            self.api.default_depth = v.parse().unwrap_or(self.api.default_depth);
        }
        if let Ok(v) = env::var("API_MAX_DEPTH") {
            self.api.max_depth = v.parse().unwrap_or(self.api.max_depth);
        }
        if let Ok(v) = env::var("API_QUERY_DEFAULT_LIMIT") {
            self.api.query_default_limit = v.parse().unwrap_or(self.api.query_default_limit);
        }
        if let Ok(v) = env::var("API_PAGE_DEFAULT_LIMIT") {
            self.api.page_default_limit = v.parse().unwrap_or(self.api.page_default_limit);
        }
        if let Ok(v) = env::var("API_PAGE_MAX_LIMIT") {
            self.api.page_max_limit = v.parse().unwrap_or(self.api.page_max_limit);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_ENABLE_CORS") {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }
        if let Ok(v) = env::var("API_CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_REALM") {
            self.security.realm = v;
        }
        if let Ok(v) = env::var("SECURITY_ADMIN_USERNAME") {
            self.security.admin_username = v;
        }
        if let Ok(v) = env::var("SECURITY_ADMIN_PASSWORD") {
            self.security.admin_password = v;
        }

        // Repository overrides
        if let Ok(v) = env::var("REPOSITORY_NAME") {
            self.repository.name = v;
        }
        if let Ok(v) = env::var("REPOSITORY_VENDOR") {
            self.repository.vendor = v;
        }
        if let Ok(v) = env::var("REPOSITORY_CLUSTER_ID") {
            self.repository.cluster_id = Some(v);
        }
        if let Ok(v) = env::var("PROJECT_VERSION") {
            self.repository.project_version = Some(v);
        }
        if let Ok(v) = env::var("PROJECT_BUILD") {
            self.repository.project_build = Some(v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                public_url: "http://localhost:8080".to_string(),
            },
            api: ApiConfig {
                default_depth: 0,
                max_depth: 20,
                query_default_limit: 200,
                page_default_limit: 20,
                page_max_limit: 1000,
                enable_request_logging: true,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            security: SecurityConfig {
                realm: "Default realm".to_string(),
                admin_username: "admin".to_string(),
                admin_password: "admin".to_string(),
            },
            repository: RepositoryConfig {
                name: "In-Memory Content Repository".to_string(),
                vendor: "Open Source Community".to_string(),
                cluster_id: None,
                project_version: None,
                project_build: None,
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.public_url = "https://staging.example.com".to_string();
        config.api.max_depth = 10;
        config.api.page_max_limit = 500;
        config.api.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.public_url = "https://app.example.com".to_string();
        config.api.max_depth = 5;
        config.api.page_max_limit = 100;
        config.api.enable_request_logging = false;
        config.api.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }

    /// Clamp a requested depth to the configured ceiling
    pub fn clamp_depth(&self, requested: Option<u32>) -> u32 {
        let depth = requested.unwrap_or(self.api.default_depth);
        if depth > self.api.max_depth {
            tracing::warn!("Requested depth {} exceeds maximum {}, clamping", depth, self.api.max_depth);
            return self.api.max_depth;
        }
        depth
    }

    /// Clamp a page size to the configured ceiling
    pub fn clamp_page_limit(&self, requested: Option<u64>) -> u64 {
        let limit = requested.unwrap_or(self.api.page_default_limit);
        if limit > self.api.page_max_limit {
            tracing::warn!("Requested limit {} exceeds maximum {}, clamping", limit, self.api.page_max_limit);
            return self.api.page_max_limit;
        }
        limit
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
