mod common;

use anyhow::Result;
use reqwest::StatusCode;
use roadwork::GenerateOptions;
use serde_json::{json, Value};

#[tokio::test]
async fn find_all_without_restrictions() -> Result<()> {
    let server = common::ensure_server(GenerateOptions::default()).await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/tasks")).send().await?;
    assert_eq!(res.status(), StatusCode::OK, "expected 200 OK, got {}", res.status());

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], json!(true), "success flag false or missing: {}", body);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3), "unexpected data: {}", body);

    Ok(())
}

#[tokio::test]
async fn query_parameters_filter_results() -> Result<()> {
    let server = common::ensure_server(GenerateOptions::default()).await?;
    let client = reqwest::Client::new();

    let body = client
        .get(server.url("/api/tasks?status=open&limit=5"))
        .send()
        .await?
        .json::<Value>()
        .await?;

    let data = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(data.len(), 2, "reserved params must not filter: {}", body);
    assert!(data.iter().all(|t| t["status"] == "open"));

    Ok(())
}

#[tokio::test]
async fn find_one_and_missing_record() -> Result<()> {
    let server = common::ensure_server(GenerateOptions::default()).await?;
    let client = reqwest::Client::new();

    let body = client.get(server.url("/api/tasks/t2")).send().await?.json::<Value>().await?;
    assert_eq!(body["data"]["title"], "Review open pull requests");

    let res = client.get(server.url("/api/tasks/nope")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], json!(false));

    Ok(())
}

#[tokio::test]
async fn create_update_delete_cycle() -> Result<()> {
    let server = common::ensure_server(GenerateOptions::default()).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/tasks"))
        .json(&json!({ "title": "Tag the release", "user_id": "3" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty(), "created record has no id: {}", created);

    let updated = client
        .put(server.url(&format!("/api/tasks/{}", id)))
        .json(&json!({ "status": "done" }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(updated["data"]["status"], "done");
    assert_eq!(updated["data"]["title"], "Tag the release");

    let res = client.delete(server.url(&format!("/api/tasks/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url(&format!("/api/tasks/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn malformed_body_is_rejected() -> Result<()> {
    let server = common::ensure_server(GenerateOptions::default()).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/tasks"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.post(server.url("/api/tasks")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST, "missing payload must be rejected");

    Ok(())
}
