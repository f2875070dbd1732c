mod common;

use common::{assert_error, pandoc_available, spawn_openai_mock, spawn_server};
use ctk_api::docx::{Document, Paragraph};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;

fn report_docx() -> Vec<u8> {
    let mut doc = Document::new();
    for text in [
        "CONFIDENTIAL PSYCHOLOGICAL EVALUATION",
        "Name: Lea Avatar",
        "CLINICAL SUMMARY AND IMPRESSIONS",
        "Lea is a kind girl. She enjoys school.",
        "Avatar family members describe her as curious.",
        "RECOMMENDATIONS",
        "Lea should keep reading every day.",
    ] {
        doc.push_paragraph(Paragraph::with_text(text));
    }
    doc.to_bytes().unwrap()
}

fn docx_form(bytes: Vec<u8>) -> Form {
    Form::new().part("docx_file", Part::bytes(bytes).file_name("report.docx"))
}

#[tokio::test]
async fn test_anonymize_report() {
    let server = spawn_server(|_| {}).await;
    let resp = reqwest::Client::new()
        .post(server.api("/summarization/anonymize_report"))
        .multipart(docx_form(report_docx()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let text: String = resp.json().await.unwrap();
    assert!(text.starts_with("CLINICAL SUMMARY AND IMPRESSIONS\n"));
    assert!(text.contains("[FIRST_NAME]"));
    assert!(text.contains("[LAST_NAME]"));
    assert!(text.contains("boy/girl"));
    assert!(!text.contains("Lea"));
    assert!(!text.contains("Avatar"));
    assert!(!text.contains("reading every day"));
}

#[tokio::test]
async fn test_anonymize_report_rejects_bad_uploads() {
    let server = spawn_server(|_| {}).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.api("/summarization/anonymize_report"))
        .multipart(Form::new().text("other_field", "value"))
        .send()
        .await
        .unwrap();
    assert_error(resp, 400, "bad_request", "Missing form field: docx_file").await;

    let resp = client
        .post(server.api("/summarization/anonymize_report"))
        .multipart(docx_form(b"not a zip archive".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let mut doc = Document::new();
    doc.push_paragraph(Paragraph::with_text("No name line here"));
    let resp = client
        .post(server.api("/summarization/anonymize_report"))
        .multipart(docx_form(doc.to_bytes().unwrap()))
        .send()
        .await
        .unwrap();
    assert_error(resp, 400, "bad_request", "Patient name not found.").await;
}

#[tokio::test]
async fn test_summarize_report_is_cached() {
    if !pandoc_available().await {
        eprintln!("pandoc not installed, skipping");
        return;
    }
    let (openai_url, calls) = spawn_openai_mock(Some("**[FIRST_NAME]** is a curious child.")).await;
    let server = spawn_server(|config| config.openai.base_url = openai_url).await;
    let client = reqwest::Client::new();
    let body = json!({"text": "[FIRST_NAME] is a kind boy/girl."});

    let resp = client
        .post(server.api("/summarization/summarize_report"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    assert_eq!(
        resp.headers()["content-type"],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"summary.docx\""
    );
    let doc = Document::from_bytes(&resp.bytes().await.unwrap()).unwrap();
    assert!(doc
        .paragraphs()
        .any(|p| p.text() == "[FIRST_NAME] is a curious child."));

    let resp = client
        .post(server.api("/summarization/summarize_report"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_summarize_report_without_reply_is_internal_error() {
    let (openai_url, calls) = spawn_openai_mock(None).await;
    let server = spawn_server(|config| config.openai.base_url = openai_url).await;

    let resp = reqwest::Client::new()
        .post(server.api("/summarization/summarize_report"))
        .json(&json!({"text": "[FIRST_NAME] is kind."}))
        .send()
        .await
        .unwrap();
    assert_error(
        resp,
        500,
        "internal",
        "No response was received from OpenAI.",
    )
    .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_summarize_report_requires_text() {
    let server = spawn_server(|_| {}).await;
    let resp = reqwest::Client::new()
        .post(server.api("/summarization/summarize_report"))
        .json(&json!({"body": "wrong field"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}
