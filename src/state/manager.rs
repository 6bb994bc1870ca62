//! State manager implementation
//!
//! Owns the replication state for a run. State is loaded once at start and
//! written out whole, as a STATE message, whenever it is persisted.

use super::types::State;
use crate::error::{Error, Result};
use crate::output::{Message, OutputSink};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// State manager for loading and persisting replication state
#[derive(Debug, Clone, Default)]
pub struct StateManager {
    /// Current state
    state: Arc<RwLock<State>>,
}

impl StateManager {
    /// Create a state manager holding `state`
    pub fn new(state: State) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Create an empty in-memory state manager
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load state from a file. Read or parse failures are fatal.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::State {
            message: format!("Failed to read state file {}: {e}", path.display()),
        })?;
        Self::from_json(&contents)
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::in_memory());
        }
        let state: State = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;
        Ok(Self::new(state))
    }

    /// Get a read lock on the current state
    pub async fn state(&self) -> tokio::sync::RwLockReadGuard<'_, State> {
        self.state.read().await
    }

    /// Get a write lock on the current state
    pub async fn state_mut(&self) -> tokio::sync::RwLockWriteGuard<'_, State> {
        self.state.write().await
    }

    /// Snapshot of the current state
    pub async fn snapshot(&self) -> State {
        self.state.read().await.clone()
    }

    /// Stored bookmark for (stream, field)
    pub async fn get_bookmark(&self, stream: &str, field: &str) -> Option<String> {
        self.state
            .read()
            .await
            .get_bookmark(stream, field)
            .map(String::from)
    }

    /// Overwrite the bookmark for (stream, field)
    pub async fn set_bookmark(&self, stream: &str, field: &str, value: impl Into<String>) {
        self.state.write().await.set_bookmark(stream, field, value);
    }

    /// Store `raw` if it is strictly newer than the current bookmark
    pub async fn advance_bookmark(
        &self,
        stream: &str,
        field: &str,
        raw: &str,
        at: DateTime<Utc>,
    ) -> bool {
        self.state
            .write()
            .await
            .advance_bookmark(stream, field, raw, at)
    }

    /// Drop all bookmarks of one stream
    pub async fn reset(&self, stream: &str) {
        if self.state.write().await.reset_stream(stream) {
            debug!("Reset bookmarks for stream {}", stream);
        }
    }

    /// Write the whole state document to the sink
    pub async fn persist(&self, sink: &mut dyn OutputSink) -> Result<()> {
        let value = self.state.read().await.to_value();
        sink.write(&Message::state(value))
    }

    /// Serialize state to JSON
    pub async fn to_json(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string(&*state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }
}
