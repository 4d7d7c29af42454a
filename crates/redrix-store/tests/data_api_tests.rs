// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Wire-format and failover tests for the persistence coordinator, driven by
//! a scripted loopback HTTP/1.1 mock server.  No external network access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use redrix_config::StoreConfig;
use redrix_model::Role;
use redrix_store::{Backend, LocalStore, StoreCoordinator};

// ── Scripted HTTP/1.1 mock server ─────────────────────────────────────────────

#[derive(Debug, Clone)]
struct CapturedRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Value,
}

type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Serve one scripted `(status, body)` response per incoming connection, in
/// order.  Every response closes its connection, so each client request
/// arrives on a fresh accept.  Captured requests are appended to the shared
/// vector as they are read.
async fn mock_server(responses: Vec<(u16, &'static str)>) -> (String, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let captured_srv = Arc::clone(&captured);

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).await.unwrap();
            let request_line = request_line.trim().to_string();
            let mut parts = request_line.splitn(3, ' ');
            let method = parts.next().unwrap_or("").to_string();
            let path = parts.next().unwrap_or("").to_string();

            let mut headers: HashMap<String, String> = HashMap::new();
            let mut content_length: usize = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    break;
                }
                if let Some((k, v)) = trimmed.split_once(": ") {
                    let key = k.to_lowercase();
                    if key == "content-length" {
                        content_length = v.parse().unwrap_or(0);
                    }
                    headers.insert(key, v.to_string());
                }
            }

            let mut body_bytes = vec![0u8; content_length];
            reader.read_exact(&mut body_bytes).await.unwrap();
            let req_body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

            captured_srv.lock().unwrap().push(CapturedRequest {
                method,
                path,
                headers,
                body: req_body,
            });

            let http_resp = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body,
            );
            let _ = write_half.write_all(http_resp.as_bytes()).await;
        }
    });

    (format!("http://127.0.0.1:{port}/app/data/v1"), captured)
}

fn store_config(base_url: &str) -> StoreConfig {
    StoreConfig {
        app_id: Some("app-1".into()),
        api_key: Some("store-key".into()),
        base_url: Some(base_url.into()),
        ..StoreConfig::default()
    }
}

fn local_store(dir: &tempfile::TempDir) -> LocalStore {
    LocalStore::new(dir.path().join("history.json"), 1000)
}

// ── Authentication ────────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_probes_with_find_one_and_api_key_header() {
    let (base_url, captured) = mock_server(vec![(200, "{}")]).await;
    let dir = tempfile::tempdir().unwrap();

    let coord =
        StoreCoordinator::connect_with_local(&store_config(&base_url), local_store(&dir)).await;
    assert_eq!(coord.backend(), Backend::Remote);

    let reqs = captured.lock().unwrap().clone();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, "POST");
    assert_eq!(reqs[0].path, "/app/data/v1/action/findOne");
    assert_eq!(
        reqs[0].headers.get("api-key").map(String::as_str),
        Some("store-key")
    );
    assert_eq!(reqs[0].body["dataSource"], "Cluster0");
    assert_eq!(reqs[0].body["database"], "chatMemory");
    assert_eq!(reqs[0].body["collection"], "conversations");
    assert_eq!(reqs[0].body["filter"]["_id"], "test");
}

#[tokio::test]
async fn failed_probe_leaves_coordinator_on_local_backend() {
    let (base_url, _captured) = mock_server(vec![(500, "{}")]).await;
    let dir = tempfile::tempdir().unwrap();

    let coord =
        StoreCoordinator::connect_with_local(&store_config(&base_url), local_store(&dir)).await;
    assert_eq!(coord.backend(), Backend::Local);
}

#[tokio::test]
async fn disconnected_is_terminal_for_the_session() {
    // Probe fails once; subsequent saves must not retry the remote store.
    let (base_url, captured) = mock_server(vec![(401, "unauthorized")]).await;
    let dir = tempfile::tempdir().unwrap();

    let coord =
        StoreCoordinator::connect_with_local(&store_config(&base_url), local_store(&dir)).await;
    coord.save(Role::User, "hello", None).await.unwrap();
    coord.save(Role::Assistant, "hi", None).await.unwrap();

    // Exactly one remote request was ever made: the probe.
    assert_eq!(captured.lock().unwrap().len(), 1);
    assert_eq!(coord.fetch_history(10).await.unwrap().len(), 2);
}

// ── Save ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_inserts_the_full_document_remotely() {
    let (base_url, captured) =
        mock_server(vec![(200, "{}"), (201, r#"{"insertedId":"x"}"#)]).await;
    let dir = tempfile::tempdir().unwrap();
    let local = local_store(&dir);

    let coord = StoreCoordinator::connect_with_local(&store_config(&base_url), local).await;
    let saved = coord
        .save(Role::User, "remote me", Some("model-a".into()))
        .await
        .unwrap();

    let reqs = captured.lock().unwrap().clone();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[1].path, "/app/data/v1/action/insertOne");
    let doc = &reqs[1].body["document"];
    assert_eq!(doc["role"], "user");
    assert_eq!(doc["content"], "remote me");
    assert_eq!(doc["model"], "model-a");
    assert_eq!(doc["id"], saved.id.as_str());
    assert!(doc["timestamp"].is_string());

    // Nothing was mirrored locally on the success path.
    let local_check = LocalStore::new(dir.path().join("history.json"), 1000);
    assert!(local_check.all().unwrap().is_empty());
}

#[tokio::test]
async fn remote_save_failure_falls_back_to_local_without_data_loss() {
    // Probe succeeds, insert fails, the follow-up find fails too — the
    // message must still be readable through the local fallback.
    let (base_url, captured) =
        mock_server(vec![(200, "{}"), (500, "insert down"), (500, "find down")]).await;
    let dir = tempfile::tempdir().unwrap();

    let coord =
        StoreCoordinator::connect_with_local(&store_config(&base_url), local_store(&dir)).await;
    assert_eq!(coord.backend(), Backend::Remote);

    let saved = coord.save(Role::User, "precious", None).await.unwrap();
    let got = coord.fetch_history(5).await.unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].id, saved.id);
    assert_eq!(got[0].content, "precious");

    // Still Connected: the per-call failure did not flip the state.
    assert_eq!(coord.backend(), Backend::Remote);
    assert_eq!(captured.lock().unwrap().len(), 3);
}

// ── Fetch ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_history_queries_newest_first_and_returns_chronological() {
    let older = redrix_model::ChatMessage::user("older", None);
    let newer = redrix_model::ChatMessage::user("newer", None);
    // The server answers the way the Data API does for sort {timestamp: -1}:
    // newest first.
    let docs = serde_json::json!({
        "documents": [
            serde_json::to_value(&newer).unwrap(),
            serde_json::to_value(&older).unwrap(),
        ]
    })
    .to_string();
    let docs: &'static str = Box::leak(docs.into_boxed_str());

    let (base_url, captured) = mock_server(vec![(200, "{}"), (200, docs)]).await;
    let dir = tempfile::tempdir().unwrap();

    let coord =
        StoreCoordinator::connect_with_local(&store_config(&base_url), local_store(&dir)).await;
    let got = coord.fetch_history(2).await.unwrap();

    assert_eq!(got.len(), 2);
    assert_eq!(got[0].content, "older");
    assert_eq!(got[1].content, "newer");

    let reqs = captured.lock().unwrap().clone();
    assert_eq!(reqs[1].path, "/app/data/v1/action/find");
    assert_eq!(reqs[1].body["sort"]["timestamp"], -1);
    assert_eq!(reqs[1].body["limit"], 2);
}

// ── Clear ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn clear_all_sends_delete_many_with_empty_filter() {
    let (base_url, captured) =
        mock_server(vec![(200, "{}"), (200, r#"{"deletedCount":7}"#)]).await;
    let dir = tempfile::tempdir().unwrap();

    let coord =
        StoreCoordinator::connect_with_local(&store_config(&base_url), local_store(&dir)).await;
    coord.clear_all().await.unwrap();

    let reqs = captured.lock().unwrap().clone();
    assert_eq!(reqs[1].path, "/app/data/v1/action/deleteMany");
    assert_eq!(reqs[1].body["filter"], serde_json::json!({}));
}

// ── Probe ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connection_reports_ok_when_remote_answers() {
    let (base_url, _captured) = mock_server(vec![(200, "{}"), (200, "{}")]).await;
    let dir = tempfile::tempdir().unwrap();

    let coord =
        StoreCoordinator::connect_with_local(&store_config(&base_url), local_store(&dir)).await;
    let report = coord.test_connection().await;
    assert!(report.ok);
}

#[tokio::test]
async fn test_connection_surfaces_remote_failure_without_fallback() {
    let (base_url, _captured) = mock_server(vec![(200, "{}"), (503, "down")]).await;
    let dir = tempfile::tempdir().unwrap();

    let coord =
        StoreCoordinator::connect_with_local(&store_config(&base_url), local_store(&dir)).await;
    let report = coord.test_connection().await;
    assert!(!report.ok);
    assert!(report.detail.contains("503"));
}
