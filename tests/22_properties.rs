mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

async fn app_with_document() -> Result<TestApp> {
    let app = TestApp::new()?;
    let res = app
        .post(
            "/nodes/",
            json!({
                "name": "doc",
                "primaryType": "nt:unstructured",
                "properties": [
                    {"name": "title", "type": "String", "multiple": false, "values": ["Hello"]},
                    {"name": "tags", "type": "String", "multiple": true, "values": ["a", "b"]}
                ]
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    Ok(app)
}

#[tokio::test]
async fn get_property() -> Result<()> {
    let app = app_with_document().await?;

    let res = app.get("/properties/doc/tags").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body,
        json!({"name": "tags", "type": "String", "multiple": true, "values": ["a", "b"]})
    );

    assert_eq!(app.get("/properties/doc/nothing").await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_property_on_node() -> Result<()> {
    let app = app_with_document().await?;

    let res = app
        .post(
            "/properties/doc",
            json!({"name": "count", "type": "Long", "multiple": false, "values": ["42"]}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.location(), Some("http://localhost:8080/properties/doc/count"));

    let res = app.get("/properties/doc/count").await?;
    assert_eq!(res.body["type"], "Long");
    assert_eq!(res.body["values"], json!(["42"]));

    let again = app
        .post(
            "/properties/doc",
            json!({"name": "count", "type": "Long", "multiple": false, "values": ["43"]}),
        )
        .await?;
    assert_eq!(again.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn binary_values_round_trip_as_base64() -> Result<()> {
    let app = app_with_document().await?;

    let res = app
        .post(
            "/properties/doc",
            json!({"name": "data", "type": "Binary", "multiple": false, "values": ["aGVsbG8="]}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(app.get("/properties/doc/data").await?.body["values"], json!(["aGVsbG8="]));

    let res = app
        .post(
            "/properties/doc",
            json!({"name": "junk", "type": "Binary", "multiple": false, "values": ["%%%"]}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn put_switches_cardinality_without_merging() -> Result<()> {
    let app = app_with_document().await?;

    let res = app
        .put(
            "/properties/doc/title",
            json!({"name": "title", "type": "String", "multiple": true, "values": ["x", "y"]}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let title = app.get("/properties/doc/title").await?;
    assert_eq!(title.body["multiple"], true);
    assert_eq!(title.body["values"], json!(["x", "y"]));

    let res = app
        .put(
            "/properties/doc/tags",
            json!({"name": "tags", "type": "String", "multiple": false, "values": ["only"]}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let tags = app.get("/properties/doc/tags").await?;
    assert_eq!(tags.body["multiple"], false);
    assert_eq!(tags.body["values"], json!(["only"]));
    Ok(())
}

#[tokio::test]
async fn single_value_without_values_is_rejected() -> Result<()> {
    let app = app_with_document().await?;
    let res = app
        .put(
            "/properties/doc/title",
            json!({"name": "title", "type": "String", "multiple": false, "values": []}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.get("/properties/doc/title").await?.body["values"], json!(["Hello"]));
    Ok(())
}

#[tokio::test]
async fn delete_property() -> Result<()> {
    let app = app_with_document().await?;

    assert_eq!(app.delete("/properties/doc/title").await?.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/properties/doc/title").await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/properties/doc/title").await?.status, StatusCode::NOT_FOUND);

    let node = app.get("/nodes/doc").await?;
    let names: Vec<&str> = node.body["properties"]
        .as_array()
        .expect("properties")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["tags"]);
    Ok(())
}
