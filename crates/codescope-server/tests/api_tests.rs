use std::fs;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use codescope_core::storage::InMemoryConversationStore;
use codescope_core::{
    Config, Error, GenerateRequest, GenerateResponse, ModelClient, ModelInfo, ProjectAnalyzer,
    Result,
};
use codescope_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Echoes prompts back; can be switched to fail like an unreachable server.
#[derive(Default)]
struct MockClient {
    down: AtomicBool,
}

impl MockClient {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        if self.down.load(Ordering::SeqCst) {
            return Err(Error::upstream("connection refused"));
        }
        Ok(GenerateResponse {
            text: format!("echo: {}", request.prompt),
            model: request.model.clone(),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        if self.down.load(Ordering::SeqCst) {
            return Err(Error::Upstream {
                message: "Ollama returned 503: loading".to_string(),
                status: Some(503),
            });
        }
        Ok(vec![ModelInfo {
            name: "llama2:latest".to_string(),
            size: Some(3825819519),
            modified_at: None,
            digest: None,
        }])
    }

    fn base_url(&self) -> &str {
        "http://ollama.test"
    }
}

fn test_app() -> (Router, Arc<MockClient>) {
    let client = Arc::new(MockClient::default());
    let state = AppState::new(
        Config::default(),
        client.clone(),
        Arc::new(InMemoryConversationStore::new()),
        Arc::new(ProjectAnalyzer::new(codescope_parser::default_extractor())),
    );
    (build_router(Arc::new(state)), client)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, client) = test_app();

    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ollama"]["url"], "http://ollama.test");
    assert_eq!(body["ollama"]["reachable"], true);

    client.set_down(true);
    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ollama"]["reachable"], false);
}

#[tokio::test]
async fn test_models_proxied() {
    let (app, client) = test_app();

    let (status, body) = send(&app, get("/api/models")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"][0]["name"], "llama2:latest");

    client.set_down(true);
    let (status, body) = send(&app, get("/api/models")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "upstream_error");
    assert_eq!(body["error"]["details"], "Ollama returned 503: loading");
}

#[tokio::test]
async fn test_chat_creates_and_extends_conversation() {
    let (app, _client) = test_app();

    let (status, body) = send(&app, post_json("/api/chat", json!({ "message": "Hello" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "echo: Hello");
    assert_eq!(body["model"], "llama2");
    assert_eq!(body["messageCount"], 2);
    let id = body["conversationId"].as_str().unwrap().to_string();
    assert!(id.starts_with("conv_"));

    let (status, body) = send(
        &app,
        post_json(
            "/api/chat",
            json!({ "message": "And again", "model": "mistral", "conversationId": id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversationId"], id.as_str());
    assert_eq!(body["model"], "mistral");
    assert_eq!(body["messageCount"], 4);

    let (status, body) = send(&app, get(&format!("/api/conversations/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[3]["model"], "mistral");
}

#[tokio::test]
async fn test_chat_upstream_failure_keeps_user_message() {
    let (app, client) = test_app();

    let (_, body) = send(&app, post_json("/api/chat", json!({ "message": "Hi" }))).await;
    let id = body["conversationId"].as_str().unwrap().to_string();

    client.set_down(true);
    let (status, body) = send(
        &app,
        post_json("/api/chat", json!({ "message": "Still there?", "conversationId": id })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "upstream_error");
    assert_eq!(body["error"]["details"], "connection refused");

    let (_, body) = send(&app, get(&format!("/api/conversations/{}", id))).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["content"], "Still there?");
}

#[tokio::test]
async fn test_chat_rejects_bad_input() {
    let (app, _client) = test_app();

    let (status, body) = send(&app, post_json("/api/chat", json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _) = send(&app, post_json("/api/chat", json!({ "message": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get("/api/conversations")).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_conversation_listing_and_delete() {
    let (app, _client) = test_app();

    let (_, body) = send(&app, post_json("/api/chat", json!({ "message": "Hello" }))).await;
    let id = body["conversationId"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get("/api/conversations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], id.as_str());
    assert_eq!(body[0]["messageCount"], 2);

    let uri = format!("/api/conversations/{}", id);
    let (status, body) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], id.as_str());

    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_local_path() {
    let (app, _client) = test_app();
    let project = tempfile::tempdir().unwrap();
    fs::create_dir_all(project.path().join("src")).unwrap();
    fs::write(
        project.path().join("package.json"),
        r#"{"name": "storefront", "dependencies": {"react": "^18.2.0"}}"#,
    )
    .unwrap();
    fs::write(
        project.path().join("src/App.jsx"),
        "import React from 'react';\nexport default () => <div />;\n",
    )
    .unwrap();
    fs::write(project.path().join("train.py"), "import numpy\n").unwrap();

    let (status, body) = send(
        &app,
        post_json(
            "/api/analyze/path",
            json!({ "path": project.path().to_string_lossy() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().unwrap().to_string();
    let analysis = &body["analysis"];
    assert_eq!(analysis["fileCount"], 3);
    assert_eq!(analysis["summary"]["name"], "storefront");
    let stack: Vec<&str> = analysis["techStack"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert!(stack.contains(&"React"));
    assert!(stack.contains(&"Python"));
    assert_eq!(analysis["dependencies"]["src/App.jsx"], json!(["react"]));
    assert_eq!(analysis["fileTree"]["src"]["type"], "directory");

    let (status, body) = send(&app, get(&format!("/api/analyses/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fileCount"], 3);

    let (status, body) = send(
        &app,
        get(&format!("/api/analyses/{}/file?path=src/App.jsx", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].as_str().unwrap().starts_with("import React"));

    let (status, _) = send(
        &app,
        get(&format!("/api/analyses/{}/file?path=missing.js", id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get(&format!("/api/analyses/{}/search?q=APP", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["path"], "src/App.jsx");

    let (status, _) = send(&app, get(&format!("/api/analyses/{}/search?q=%28", id))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/analyses/{}", id);
    let (status, _) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_path_must_be_directory() {
    let (app, _client) = test_app();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("README.md");
    fs::write(&file, "# readme").unwrap();

    let (status, body) = send(
        &app,
        post_json("/api/analyze/path", json!({ "path": file.to_string_lossy() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        for (name, content) in files {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn zip_project() -> Vec<u8> {
    build_zip(&[
        ("demo/package.json", r#"{"name": "demo-app", "dependencies": {"express": "^4.18.2"}}"#),
        ("demo/index.js", "const express = require('express');\n"),
        ("demo/node_modules/express/index.js", "module.exports = {};\n"),
    ])
}

fn multipart_upload(archive: &[u8]) -> Request<Body> {
    let boundary = "codescope-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"project\"; filename=\"demo.zip\"\r\nContent-Type: application/zip\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(archive);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_analyze_uploaded_archive() {
    let (app, _client) = test_app();

    let (status, body) = send(&app, multipart_upload(&zip_project())).await;
    assert_eq!(status, StatusCode::OK);
    let analysis = &body["analysis"];
    assert_eq!(analysis["summary"]["name"], "demo-app");
    assert_eq!(analysis["fileCount"], 2);
    assert_eq!(analysis["entryPoints"], json!(["index.js"]));
    assert_eq!(analysis["dependencies"]["index.js"], json!(["express"]));

    let id = body["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        get(&format!("/api/analyses/{}/file?path=package.json", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].as_str().unwrap().contains("demo-app"));
}

#[tokio::test]
async fn test_upload_rejects_non_zip() {
    let (app, _client) = test_app();

    let (status, body) = send(&app, multipart_upload(b"plain text, not an archive")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_upload_with_clashing_entries_is_bad_request() {
    let (app, _client) = test_app();
    let archive = build_zip(&[("demo/lib", "a file"), ("demo/lib/util.js", "x")]);

    let (status, body) = send(&app, multipart_upload(&archive)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_missing_query_parameter_is_json_error() {
    let (app, _client) = test_app();
    let project = tempfile::tempdir().unwrap();
    fs::write(project.path().join("index.js"), "").unwrap();

    let (_, body) = send(
        &app,
        post_json(
            "/api/analyze/path",
            json!({ "path": project.path().to_string_lossy() }),
        ),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    for uri in [
        format!("/api/analyses/{}/file", id),
        format!("/api/analyses/{}/search", id),
    ] {
        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "bad_request", "{}", uri);
    }
}
