//! Tests for StateManager

use super::*;
use crate::cursor::parse_timestamp;
use crate::error::Error;
use crate::output::{MemorySink, Message};
use serde_json::json;
use std::io::Write;

// ============================================================================
// Construction Tests
// ============================================================================

#[tokio::test]
async fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.state().await.bookmarks.is_empty());
}

#[tokio::test]
async fn test_from_json() {
    let manager =
        StateManager::from_json(r#"{"bookmarks": {"alerts": {"created_at": "2024-02-01T00:00:00Z"}}}"#)
            .unwrap();
    assert_eq!(
        manager.get_bookmark("alerts", "created_at").await,
        Some("2024-02-01T00:00:00Z".to_string())
    );
}

#[test]
fn test_from_json_empty_is_empty_state() {
    assert!(StateManager::from_json("  ").is_ok());
}

#[test]
fn test_from_json_invalid() {
    let err = StateManager::from_json("{not json").unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

#[tokio::test]
async fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"bookmarks": {{"incidents": {{"updated_at": "2024-05-01T10:00:00Z"}}}}}}"#
    )
    .unwrap();

    let manager = StateManager::from_file(file.path()).unwrap();
    assert_eq!(
        manager.get_bookmark("incidents", "updated_at").await,
        Some("2024-05-01T10:00:00Z".to_string())
    );
}

#[test]
fn test_from_missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = StateManager::from_file(dir.path().join("state.json")).unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

// ============================================================================
// Bookmark Tests
// ============================================================================

#[tokio::test]
async fn test_advance_bookmark() {
    let manager = StateManager::in_memory();
    let newer = "2024-03-01T00:00:00Z";
    let older = "2024-01-01T00:00:00Z";

    assert!(
        manager
            .advance_bookmark("severities", "updated_at", newer, parse_timestamp(newer).unwrap())
            .await
    );
    assert!(
        !manager
            .advance_bookmark("severities", "updated_at", older, parse_timestamp(older).unwrap())
            .await
    );
    assert_eq!(
        manager.get_bookmark("severities", "updated_at").await,
        Some(newer.to_string())
    );
}

#[tokio::test]
async fn test_reset() {
    let manager = StateManager::in_memory();
    manager
        .set_bookmark("incidents", "updated_at", "2024-01-01T00:00:00Z")
        .await;
    manager
        .set_bookmark("users", "updated_at", "2024-01-01T00:00:00Z")
        .await;

    manager.reset("incidents").await;
    manager.reset("never-synced").await;

    let state = manager.snapshot().await;
    assert!(!state.bookmarks.contains_key("incidents"));
    assert!(state.bookmarks.contains_key("users"));
}

#[tokio::test]
async fn test_clones_share_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();
    clone.set_bookmark("alerts", "created_at", "2024-01-01Z").await;
    assert_eq!(
        manager.get_bookmark("alerts", "created_at").await,
        Some("2024-01-01Z".to_string())
    );
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_persist_writes_whole_document() {
    let manager = StateManager::in_memory();
    manager
        .set_bookmark("alerts", "created_at", "2024-02-15Z")
        .await;

    let mut sink = MemorySink::new();
    manager.persist(&mut sink).await.unwrap();
    manager.persist(&mut sink).await.unwrap();

    let expected = Message::state(json!({
        "bookmarks": {"alerts": {"created_at": "2024-02-15Z"}}
    }));
    assert_eq!(sink.messages(), &[expected.clone(), expected]);
}

#[tokio::test]
async fn test_to_json() {
    let manager = StateManager::in_memory();
    manager.set_bookmark("users", "x", "1").await;
    assert_eq!(
        manager.to_json().await.unwrap(),
        r#"{"bookmarks":{"users":{"x":"1"}}}"#
    );
}
