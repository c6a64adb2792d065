mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

fn string_property(name: &str, value: &str) -> Value {
    json!({"name": name, "type": "String", "multiple": false, "values": [value]})
}

#[tokio::test]
async fn root_node_representation() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/nodes/").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "");
    assert_eq!(res.body["path"], "/");
    assert_eq!(res.body["primaryType"], "rep:root");
    assert_eq!(res.body["nodes"], json!([]));

    let res = app.get("/nodes?depth=1").await?;
    let children = res.body["nodes"].as_array().expect("children");
    assert!(children.iter().any(|c| c["name"] == "hippo:configuration"));
    Ok(())
}

#[tokio::test]
async fn create_node_and_read_it_back() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .post(
            "/nodes/",
            json!({
                "name": "newnode",
                "primaryType": "nt:unstructured",
                "properties": [string_property("myproperty", "test")]
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.location(), Some("http://localhost:8080/nodes/newnode"));

    let res = app.get("/nodes/newnode").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["path"], "/newnode");
    assert_eq!(res.body["primaryType"], "nt:unstructured");
    assert_eq!(res.body["properties"], json!([string_property("myproperty", "test")]));
    Ok(())
}

#[tokio::test]
async fn depth_controls_child_expansion() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .post(
            "/nodes/",
            json!({
                "name": "parent",
                "primaryType": "nt:unstructured",
                "nodes": [
                    {"name": "first", "primaryType": "nt:unstructured",
                     "nodes": [{"name": "grandchild", "primaryType": "nt:unstructured"}]},
                    {"name": "second", "primaryType": "nt:unstructured"}
                ]
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let shallow = app.get("/nodes/parent?depth=0").await?;
    assert_eq!(shallow.body["nodes"].as_array().map(Vec::len), Some(0));

    let one = app.get("/nodes/parent?depth=1").await?;
    let children = one.body["nodes"].as_array().expect("children");
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["name"], "first");
    assert_eq!(children[0]["nodes"], json!([]));

    // writes are not depth limited: the grandchild was created
    let two = app.get("/nodes/parent?depth=2").await?;
    assert_eq!(two.body["nodes"][0]["nodes"][0]["name"], "grandchild");
    assert_eq!(app.get("/nodes/parent/first/grandchild").await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_mixins_are_skipped() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .post(
            "/nodes/",
            json!({
                "name": "versioned",
                "primaryType": "nt:unstructured",
                "mixinTypes": ["mix:versionable", "not:a:real:mixin"]
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.get("/nodes/versioned").await?;
    assert_eq!(res.body["mixinTypes"], json!(["mix:versionable"]));
    Ok(())
}

#[tokio::test]
async fn reserved_properties_are_not_exposed() -> Result<()> {
    let app = TestApp::new()?;
    app.post(
        "/nodes/",
        json!({"name": "ref", "primaryType": "nt:unstructured", "mixinTypes": ["mix:referenceable"]}),
    )
    .await?;

    let res = app.get("/nodes/ref").await?;
    let properties = res.body["properties"].as_array().expect("properties");
    assert!(properties.iter().all(|p| !p["name"].as_str().unwrap_or_default().starts_with("jcr:")));
    assert!(!res.body["identifier"].as_str().unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn put_replaces_content_and_keeps_identifier() -> Result<()> {
    let app = TestApp::new()?;
    app.post(
        "/nodes/",
        json!({
            "name": "doc",
            "primaryType": "nt:unstructured",
            "mixinTypes": ["mix:referenceable"],
            "properties": [string_property("title", "Old"), string_property("obsolete", "x")],
            "nodes": [{"name": "old-child", "primaryType": "nt:unstructured"}]
        }),
    )
    .await?;
    let before = app.get("/nodes/doc").await?;

    let res = app
        .put(
            "/nodes/doc",
            json!({
                "name": "doc",
                "primaryType": "nt:unstructured",
                "mixinTypes": ["mix:referenceable"],
                "properties": [string_property("title", "New")],
                "nodes": [{"name": "new-child", "primaryType": "nt:unstructured"}]
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let after = app.get("/nodes/doc?depth=1").await?;
    assert_eq!(after.body["identifier"], before.body["identifier"]);
    assert_eq!(after.body["properties"], json!([string_property("title", "New")]));
    let children: Vec<&str> = after.body["nodes"]
        .as_array()
        .expect("children")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(children, vec!["new-child"]);
    Ok(())
}

#[tokio::test]
async fn validation_and_missing_paths() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.post("/nodes/", json!({"name": "untyped"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, json!({"statusCode": 400, "message": "Bad Request"}));

    let res = app
        .post("/nodes/missing/parent", json!({"name": "x", "primaryType": "nt:unstructured"}))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Not Found");

    assert_eq!(app.get("/nodes/nowhere").await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/nodes/?depth=deep").await?.status, StatusCode::BAD_REQUEST);

    let res = app
        .put("/nodes/nowhere", json!({"name": "nowhere", "primaryType": "nt:unstructured"}))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.put("/nodes/", json!({"name": "", "primaryType": "rep:root"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn duplicate_child_conflicts() -> Result<()> {
    let app = TestApp::new()?;
    let node = json!({"name": "twice", "primaryType": "nt:unstructured"});

    assert_eq!(app.post("/nodes/", node.clone()).await?.status, StatusCode::CREATED);
    assert_eq!(app.post("/nodes/", node).await?.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn failed_create_leaves_nothing_behind() -> Result<()> {
    let app = TestApp::new()?;
    let res = app
        .post(
            "/nodes/",
            json!({
                "name": "half",
                "primaryType": "nt:unstructured",
                "properties": [
                    string_property("fine", "ok"),
                    {"name": "broken", "type": "Text", "multiple": false, "values": ["x"]}
                ]
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.get("/nodes/half").await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_removes_subtree() -> Result<()> {
    let app = TestApp::new()?;
    app.post(
        "/nodes/",
        json!({
            "name": "gone",
            "primaryType": "nt:unstructured",
            "nodes": [{"name": "child", "primaryType": "nt:unstructured"}]
        }),
    )
    .await?;

    assert_eq!(app.delete("/nodes/gone").await?.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/nodes/gone").await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/nodes/gone/child").await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/nodes/gone").await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/nodes/").await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let app = TestApp::new()?;
    let res = app.post("/nodes/", json!(["not", "a", "node"])).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_of_distinct_nodes_all_succeed() -> Result<()> {
    let app = Arc::new(TestApp::new()?);

    let mut tasks = Vec::new();
    for i in 0..20 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            app.post(
                "/nodes/",
                json!({"name": format!("node-{}", i), "primaryType": "nt:unstructured"}),
            )
            .await
        }));
    }

    for task in tasks {
        let res = task.await??;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    }

    let res = app.get("/nodes/?depth=1").await?;
    let names: Vec<&str> = res.body["nodes"]
        .as_array()
        .expect("children")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    for i in 0..20 {
        assert!(names.contains(&format!("node-{}", i).as_str()), "node-{} missing", i);
    }
    Ok(())
}
