//! Execution engine module
//!
//! Main sync loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Runs every selected stream in catalog order
//! - `SyncConfig` - Checkpoint cadence and stream resets
//! - `SyncStats` - Per-stream and total counts of a run
//!
//! Streams run strictly one after another; a fatal error in any stream
//! aborts the run.

mod extract;
mod types;

pub use types::{StreamStats, SyncConfig, SyncStats, DEFAULT_CHECKPOINT_INTERVAL};

use crate::catalog::{resolve, Catalog};
use crate::error::Result;
use crate::output::{Message, OutputSink};
use crate::schema::project_schema;
use crate::state::StateManager;
use crate::streams::EntityAccessor;
use extract::StreamRun;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<A: EntityAccessor> {
    /// Record source
    accessor: A,
    /// State manager
    state: StateManager,
    /// Sync configuration
    config: SyncConfig,
}

impl<A: EntityAccessor> SyncEngine<A> {
    /// Create a new sync engine
    pub fn new(accessor: A, state: StateManager) -> Self {
        Self {
            accessor,
            state,
            config: SyncConfig::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get the accessor
    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// Sync every selected stream of `catalog`, or every known stream when
    /// no catalog is given.
    pub async fn run(
        &self,
        catalog: Option<&Catalog>,
        sink: &mut dyn OutputSink,
    ) -> Result<SyncStats> {
        let start = Instant::now();
        let mut stats = SyncStats::new();

        for stream in &self.config.reset_streams {
            info!("Resetting bookmarks for {}", stream);
            self.state.reset(stream).await;
        }
        self.state.persist(sink).await?;

        for resolved in resolve(catalog)? {
            if !resolved.selected {
                debug!("{}: not selected", resolved.tap_stream_id);
                continue;
            }
            let Some(def) = resolved.definition else {
                warn!(
                    "Stream '{}' not found in available streams, skipping",
                    resolved.tap_stream_id
                );
                stats.add_skipped_stream();
                continue;
            };

            info!(
                "Syncing stream: {} ({})",
                def.name, resolved.run.replication_method
            );
            let bookmark_properties = if resolved.run.is_incremental() {
                resolved.run.replication_key.iter().cloned().collect()
            } else {
                Vec::new()
            };
            sink.write(&Message::schema(
                def.name,
                project_schema(&resolved.schema, &resolved.fields),
                resolved.key_properties.clone(),
                bookmark_properties,
            ))?;

            let run = StreamRun {
                accessor: &self.accessor,
                state: &self.state,
                config: &self.config,
                def,
                resolved: &resolved,
            };
            stats.add_stream(run.run(sink).await?);
        }

        self.state.persist(sink).await?;
        sink.finish()?;

        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Sync complete: {} streams, {} records emitted, {} skipped in {} ms",
            stats.streams_synced(),
            stats.records_emitted(),
            stats.records_skipped(),
            stats.duration_ms
        );
        Ok(stats)
    }
}
