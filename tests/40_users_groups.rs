mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn list_users_with_links() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/users").await?;
    assert_eq!(res.status, StatusCode::OK);
    let users = res.body["users"].as_array().expect("users");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "admin");
    assert_eq!(users[0]["uri"], "http://localhost:8080/users/admin");
    assert!(users[0].get("password").is_none());

    let rels: Vec<&str> = res.body["links"]
        .as_array()
        .expect("links")
        .iter()
        .filter_map(|l| l["rel"].as_str())
        .collect();
    assert_eq!(rels, vec!["first", "next"]);

    let page = app.get("/users?limit=5&offset=10").await?;
    assert_eq!(page.body["users"], json!([]));
    assert_eq!(page.body["links"][0]["rel"], "prev");
    assert_eq!(page.body["links"][0]["href"], "http://localhost:8080/users?offset=5&limit=5");
    Ok(())
}

#[tokio::test]
async fn paging_links_saturate_at_the_largest_offset() -> Result<()> {
    let app = TestApp::new()?;

    for collection in ["/users", "/groups"] {
        let res = app.get(&format!("{}?offset={}", collection, u64::MAX)).await?;
        assert_eq!(res.status, StatusCode::OK, "{}", collection);
        let next = res.body["links"]
            .as_array()
            .expect("links")
            .iter()
            .find(|l| l["rel"] == "next")
            .expect("next link")
            .clone();
        assert!(next["href"].as_str().expect("href").contains(&format!("offset={}", u64::MAX)));
    }
    Ok(())
}

#[tokio::test]
async fn create_user_and_log_in() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .post(
            "/users",
            json!({
                "username": "editor",
                "password": "editor-pw",
                "firstName": "Ed",
                "email": "editor@example.com"
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.location(), Some("http://localhost:8080/users/editor"));

    let me = app
        .request(Method::GET, "/users/me", None, Some(("editor", "editor-pw")))
        .await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "editor");
    assert_eq!(me.body["firstName"], "Ed");
    assert_eq!(me.body["path"], "hippo:configuration/hippo:users/editor");
    assert_eq!(me.body["groups"], json!([]));
    Ok(())
}

#[tokio::test]
async fn user_conflicts_and_validation() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.post("/users", json!({"username": "admin", "password": "x"})).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["message"], "User with name 'admin' already exists.");

    let res = app
        .post("/users", json!({"username": "ext", "password": "x", "external": true}))
        .await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(
        res.body["message"],
        "External managed users can't be created through this interface."
    );

    let res = app.post("/users", json!({"username": "nopass"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn user_detail_lists_group_memberships() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/users/admin").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["groups"][0]["name"], "admin");
    assert_eq!(res.body["groups"][0]["href"], "http://localhost:8080/groups/admin");

    let groups = app.get("/users/admin/groups").await?;
    assert_eq!(groups.body.as_array().map(Vec::len), Some(1));

    assert_eq!(app.get("/users/ghost").await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/users/ghost/groups").await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_user() -> Result<()> {
    let app = TestApp::new()?;
    app.post("/users", json!({"username": "temp", "password": "temp-pw"})).await?;

    assert_eq!(app.delete("/users/temp").await?.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/users/temp").await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/users/temp").await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn group_lifecycle() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .post(
            "/groups",
            json!({"name": "editors", "description": "Content editors", "members": ["admin"]}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.location(), Some("http://localhost:8080/groups/editors"));

    let group = app.get("/groups/editors").await?;
    assert_eq!(group.body["description"], "Content editors");
    assert_eq!(group.body["members"], json!(["admin"]));

    let list = app.get("/groups").await?;
    let groups = list.body["groups"].as_array().expect("groups");
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g["href"].is_string()));

    let memberships = app.get("/users/admin/groups").await?;
    assert_eq!(memberships.body.as_array().map(Vec::len), Some(2));

    let dup = app.post("/groups", json!({"name": "editors"})).await?;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    assert_eq!(app.delete("/groups/editors").await?.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/groups/editors").await?.status, StatusCode::NOT_FOUND);
    Ok(())
}
