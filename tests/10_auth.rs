mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn public_endpoints_need_no_credentials() -> Result<()> {
    let app = TestApp::new()?;

    let health = app.request(Method::GET, "/health", None, None).await?;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");

    let hello = app.request(Method::GET, "/hello", None, None).await?;
    assert_eq!(hello.status, StatusCode::OK);
    assert_eq!(hello.body["message"], "Hello World from In-Memory Content Repository");
    Ok(())
}

#[tokio::test]
async fn missing_credentials_get_a_challenge() -> Result<()> {
    let app = TestApp::new()?;
    let res = app.request(Method::GET, "/nodes/", None, None).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, json!({"statusCode": 401, "message": "Unauthorized"}));
    let challenge = res.headers.get(header::WWW_AUTHENTICATE).expect("challenge header");
    assert!(challenge.to_str()?.starts_with("Basic realm="));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .request(Method::GET, "/nodes/", None, Some(("admin", "not-the-password")))
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.request(Method::GET, "/", None, Some(("nobody", "admin"))).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn valid_credentials_reach_the_repository() -> Result<()> {
    let app = TestApp::new()?;
    let res = app.get("/").await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["vendor"]["name"], "In-Memory Content Repository");
    assert_eq!(res.body["vendor"]["version"], env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[tokio::test]
async fn deactivated_user_cannot_log_in() -> Result<()> {
    let app = TestApp::new()?;
    let created = app
        .post(
            "/users",
            json!({"username": "dormant", "password": "dormant-pw", "active": false}),
        )
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);

    let res = app
        .request(Method::GET, "/users/me", None, Some(("dormant", "dormant-pw")))
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
