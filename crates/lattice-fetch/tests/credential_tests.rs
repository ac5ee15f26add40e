//! Tests for the credential token adapter and its stores.

mod common;

use std::sync::Arc;

use common::{FailingStore, Harness, Reply, ScriptedTransport};
use lattice_fetch::{
    CredentialStore, HttpClient, JsonFileStore, KeyValueStore, MemoryStore, RequestOptions,
    TOKEN_KEY,
};
use serde_json::json;

#[tokio::test]
async fn test_token_round_trip() {
    let store = MemoryStore::new();
    let credentials = CredentialStore::new(Arc::new(store.clone()));

    assert_eq!(credentials.key(), TOKEN_KEY);
    assert_eq!(credentials.get().await, None);

    credentials.set("abc").await;
    assert_eq!(credentials.get().await.as_deref(), Some("abc"));
    assert_eq!(store.get_item("@auth_token").await.unwrap().as_deref(), Some("abc"));

    credentials.remove().await;
    assert_eq!(credentials.get().await, None);
}

#[tokio::test]
async fn test_custom_key() {
    let store = MemoryStore::new();
    let credentials = CredentialStore::new(Arc::new(store.clone())).with_key("session");

    credentials.set("xyz").await;
    assert_eq!(store.get_item("session").await.unwrap().as_deref(), Some("xyz"));
    assert_eq!(store.get_item(TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_failing_store_degrades() {
    let credentials = CredentialStore::new(Arc::new(FailingStore));

    // None of these surface the storage error
    credentials.set("abc").await;
    assert_eq!(credentials.get().await, None);
    credentials.remove().await;
}

#[tokio::test]
async fn test_failing_store_does_not_block_requests() {
    let transport = ScriptedTransport::new([Reply::text(200, "ok")]);
    let client = HttpClient::builder()
        .transport(transport.clone())
        .storage(FailingStore)
        .build()
        .unwrap();

    client.set_token("abc").await;
    let response = client
        .get("https://a.test/", RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.text(), "ok");
    assert!(transport.last_request().headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_with_failing_store_still_returns_error() {
    let transport = ScriptedTransport::new([Reply::json(401, json!({}))]);
    let client = HttpClient::builder()
        .transport(transport)
        .storage(FailingStore)
        .build()
        .unwrap();

    let err = client
        .get("https://a.test/", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_client_token_helpers() {
    let harness = Harness::replying([Reply::text(200, "ok")]);

    harness.client.set_token("abc").await;
    assert_eq!(harness.client.get_token().await.as_deref(), Some("abc"));
    assert_eq!(harness.store.get_item(TOKEN_KEY).await.unwrap().as_deref(), Some("abc"));

    harness.client.clear_token().await;
    assert_eq!(harness.client.get_token().await, None);
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn test_file_store_persists_across_clients() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let first = HttpClient::builder()
        .transport(ScriptedTransport::new([]))
        .storage(JsonFileStore::new(&path))
        .build()
        .unwrap();
    first.set_token("persisted").await;

    let content = std::fs::read_to_string(&path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(document, json!({"@auth_token": "persisted"}));

    let transport = ScriptedTransport::new([Reply::text(200, "ok")]);
    let second = HttpClient::builder()
        .transport(transport.clone())
        .storage(JsonFileStore::new(&path))
        .build()
        .unwrap();
    second.get("https://a.test/", RequestOptions::new()).await.unwrap();
    assert_eq!(
        transport.last_request().headers["authorization"],
        "Bearer persisted"
    );
}

#[tokio::test]
async fn test_file_store_cleared_on_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let store = JsonFileStore::new(&path);
    store.set_item(TOKEN_KEY, "stale").await.unwrap();
    store.set_item("refresh", "keep-me").await.unwrap();

    let client = HttpClient::builder()
        .transport(ScriptedTransport::new([Reply::json(401, json!({}))]))
        .storage(JsonFileStore::new(&path))
        .build()
        .unwrap();
    client.get("https://a.test/", RequestOptions::new()).await.unwrap_err();

    assert_eq!(store.get_item(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(store.get_item("refresh").await.unwrap().as_deref(), Some("keep-me"));
}
