//! State management module
//!
//! Handles bookmark tracking and checkpointing. State is carried between
//! runs so that incremental streams resume where they stopped.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - the `{"bookmarks": {stream: {field: value}}}` document
//! - `StateManager` - loading, monotonic updates, and persistence to the sink

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{State, StreamBookmarks};

#[cfg(test)]
mod manager_tests;
