mod common;

use common::{assert_error, spawn_server};
use ctk_api::config::Environment;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_and_root_redirect() {
    let server = spawn_server(|_| {}).await;

    let resp = reqwest::get(format!("{}/health", server.url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    // reqwest follows the redirect to /health
    let resp = reqwest::get(format!("{}/", server.url)).await.unwrap();
    assert_eq!(resp.url().path(), "/health");
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = spawn_server(|_| {}).await;
    let resp = reqwest::Client::new()
        .get(server.api("/diagnoses"))
        .header("Origin", "http://example.org")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_diagnosis_lifecycle() {
    let server = spawn_server(|_| {}).await;
    let client = reqwest::Client::new();

    let resp = client.get(server.api("/diagnoses")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));

    let resp = client
        .post(server.api("/diagnoses"))
        .json(&json!({
            "diagnosis": {
                "text": "Anxiety Disorders",
                "children": [{"text": "Generalized Anxiety Disorder"}, {"text": "Social Anxiety Disorder"}]
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let anxiety: Value = resp.json().await.unwrap();
    assert_eq!(anxiety["text"], "Anxiety Disorders");
    assert_eq!(anxiety["parent_id"], Value::Null);
    assert_eq!(anxiety["children"].as_array().unwrap().len(), 2);
    let anxiety_id = anxiety["id"].as_i64().unwrap();
    let social_id = anxiety["children"][1]["id"].as_i64().unwrap();

    let resp = client
        .post(server.api("/diagnoses"))
        .json(&json!({"diagnosis": {"text": "Mood Disorders"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let mood_id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    // Rename and move a child to the other root
    let resp = client
        .patch(server.api(&format!("/diagnoses/{}", social_id)))
        .json(&json!({"text": "Social Phobia", "parent_id": mood_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let moved: Value = resp.json().await.unwrap();
    assert_eq!(moved["text"], "Social Phobia");
    assert_eq!(moved["parent_id"], mood_id);

    let roots: Value = client
        .get(server.api("/diagnoses"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(roots.as_array().unwrap().len(), 2);
    assert_eq!(roots[0]["children"].as_array().unwrap().len(), 1);
    assert_eq!(roots[1]["children"][0]["text"], "Social Phobia");

    let resp = client
        .delete(server.api(&format!("/diagnoses/{}", anxiety_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let roots: Value = client
        .get(server.api("/diagnoses"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(roots.as_array().unwrap().len(), 1);
    assert_eq!(roots[0]["id"], mood_id);
}

#[tokio::test]
async fn test_diagnosis_errors() {
    let server = spawn_server(|_| {}).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.api("/diagnoses"))
        .json(&json!({"diagnosis": {"text": "Orphan"}, "parent_id": 9999}))
        .send()
        .await
        .unwrap();
    assert_error(
        resp,
        404,
        "not_found",
        "The specified parent diagnosis node does not exist.",
    )
    .await;

    let resp = client
        .patch(server.api("/diagnoses/9999"))
        .json(&json!({"text": "Nothing"}))
        .send()
        .await
        .unwrap();
    assert_error(resp, 404, "not_found", "The specified diagnosis does not exist.").await;

    let resp = client
        .delete(server.api("/diagnoses/9999"))
        .send()
        .await
        .unwrap();
    assert_error(resp, 404, "not_found", "The specified diagnosis does not exist.").await;

    let root: Value = client
        .post(server.api("/diagnoses"))
        .json(&json!({"diagnosis": {"text": "Root", "children": [{"text": "Child"}]}}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let root_id = root["id"].as_i64().unwrap();
    let child_id = root["children"][0]["id"].as_i64().unwrap();

    let resp = client
        .patch(server.api(&format!("/diagnoses/{}", root_id)))
        .json(&json!({"parent_id": child_id}))
        .send()
        .await
        .unwrap();
    assert_error(
        resp,
        400,
        "bad_request",
        "Cannot move a diagnosis to a child of itself.",
    )
    .await;

    let resp = client
        .patch(server.api(&format!("/diagnoses/{}", child_id)))
        .json(&json!({"parent_id": 9999}))
        .send()
        .await
        .unwrap();
    assert_error(
        resp,
        404,
        "not_found",
        "The specified parent diagnosis does not exist.",
    )
    .await;
}

#[tokio::test]
async fn test_malformed_requests_are_bad_requests() {
    let server = spawn_server(|_| {}).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.api("/diagnoses"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .post(server.api("/diagnoses"))
        .json(&json!({"diagnosis": {"text": "x".repeat(2049)}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .delete(server.api("/diagnoses/abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_development_environment_seeds_diagnoses() {
    let server = spawn_server(|config| config.app.environment = Environment::Development).await;
    let roots: Value = reqwest::get(server.api("/diagnoses"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(roots.as_array().unwrap().len(), 8);
    assert_eq!(roots[0]["text"], "Neurodevelopmental Disorders");
}
