use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use super::config::Connection;

/// Thin HTTP client for the REST facade, sending Basic credentials on every call
pub struct ApiClient {
    http: reqwest::Client,
    connection: Connection,
}

/// What a successful call produced
#[derive(Debug)]
pub enum ApiResponse {
    Body(Value),
    Created(Option<String>),
    NoContent,
}

impl ApiClient {
    pub fn new(connection: Connection) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("jcr/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, connection })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.connection.url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.connection.username {
            Some(username) => builder.basic_auth(username, self.connection.password.as_deref()),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        expect_body(self.send(self.request(Method::GET, path)).await?)
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        expect_body(self.send(self.request(Method::GET, path).query(query)).await?)
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<ApiResponse> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> anyhow::Result<ApiResponse> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<ApiResponse> {
        self.send(self.request(Method::DELETE, path)).await
    }

    async fn send(&self, builder: RequestBuilder) -> anyhow::Result<ApiResponse> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            anyhow::bail!("{} {}", status.as_u16(), message);
        }

        match status {
            StatusCode::CREATED => {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Ok(ApiResponse::Created(location))
            }
            StatusCode::NO_CONTENT => Ok(ApiResponse::NoContent),
            _ => Ok(ApiResponse::Body(response.json().await?)),
        }
    }
}

fn expect_body(response: ApiResponse) -> anyhow::Result<Value> {
    match response {
        ApiResponse::Body(value) => Ok(value),
        other => anyhow::bail!("expected a response body, got {:?}", other),
    }
}

/// Join a repository path onto a resource collection, e.g. `/nodes` + `content/doc`
pub fn resource_path(collection: &str, path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        format!("{}/", collection)
    } else {
        format!("{}/{}", collection, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_path() {
        assert_eq!(resource_path("/nodes", "/"), "/nodes/");
        assert_eq!(resource_path("/nodes", "content/documents"), "/nodes/content/documents");
        assert_eq!(resource_path("/properties", "/content/doc/title/"), "/properties/content/doc/title");
    }
}
