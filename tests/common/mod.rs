#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use jcr_rest_api::auth::basic_authorization;
use jcr_rest_api::config::AppConfig;
use jcr_rest_api::repository::memory::MemoryRepository;
use jcr_rest_api::repository::Credentials;
use jcr_rest_api::state::AppState;

pub const ADMIN: (&str, &str) = ("admin", "admin");

/// The full router over a freshly bootstrapped in-memory repository
pub struct TestApp {
    router: Router,
    pub state: AppState<MemoryRepository>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let repository = MemoryRepository::new();
        repository.bootstrap(&Credentials::new(ADMIN.0, ADMIN.1))?;

        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        let state = AppState::new(repository, config);
        let router = jcr_rest_api::app(state.clone());
        Ok(Self { router, state })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        credentials: Option<(&str, &str)>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((username, password)) = credentials {
            builder = builder.header(header::AUTHORIZATION, basic_authorization(username, password));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, None, Some(ADMIN)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(body), Some(ADMIN)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, Some(body), Some(ADMIN)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, None, Some(ADMIN)).await
    }
}
