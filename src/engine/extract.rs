//! Per-stream extraction
//!
//! Drains one stream from its accessor, filters by bookmark in INCREMENTAL
//! mode, projects and emits records, and maintains the stream's bookmark.

use super::types::{StreamStats, SyncConfig};
use crate::catalog::ResolvedStream;
use crate::cursor::{parse_timestamp, CursorValue};
use crate::error::{Error, Result};
use crate::output::{Message, OutputSink};
use crate::schema::project_record;
use crate::state::StateManager;
use crate::streams::{EntityAccessor, StreamDefinition};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything one stream run needs
pub(crate) struct StreamRun<'a, A: EntityAccessor + ?Sized> {
    pub accessor: &'a A,
    pub state: &'a StateManager,
    pub config: &'a SyncConfig,
    pub def: &'static StreamDefinition,
    pub resolved: &'a ResolvedStream,
}

impl<A: EntityAccessor + ?Sized> StreamRun<'_, A> {
    /// Run the stream to completion
    pub async fn run(&self, sink: &mut dyn OutputSink) -> Result<StreamStats> {
        let start = Instant::now();
        let mut stats = StreamStats::new(self.def.name);

        match (self.resolved.run.is_incremental(), self.resolved.run.replication_key.as_deref()) {
            (true, Some(key)) => self.incremental(key, sink, &mut stats).await?,
            (_, key) => self.full_table(key, sink, &mut stats).await?,
        }

        self.state.persist(sink).await?;

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "{}: emitted {} records, skipped {} ({} ms)",
            stats.name, stats.emitted, stats.skipped, stats.duration_ms
        );
        Ok(stats)
    }

    /// Emit only records newer than the stored bookmark, advancing it as
    /// records go out and checkpointing at a fixed cadence.
    async fn incremental(
        &self,
        key: &str,
        sink: &mut dyn OutputSink,
        stats: &mut StreamStats,
    ) -> Result<()> {
        let name = self.def.name;
        let start_at = self.starting_bookmark(key).await;
        let time_extracted = Utc::now();
        let mut records = self.accessor.records(self.def);

        while let Some(record) = records.try_next().await? {
            let (raw, at) = match CursorValue::of(&record, key) {
                CursorValue::Valid { raw, at } => (raw, at),
                CursorValue::Missing => {
                    return Err(Error::MissingCursor {
                        stream: name.to_string(),
                        field: key.to_string(),
                    })
                }
                CursorValue::Malformed(value) => {
                    return Err(Error::MalformedCursor {
                        stream: name.to_string(),
                        field: key.to_string(),
                        value,
                    })
                }
            };

            if start_at.is_some_and(|start| at <= start) {
                stats.skipped += 1;
                continue;
            }

            self.emit(record, time_extracted, sink).await?;
            stats.emitted += 1;
            self.state.advance_bookmark(name, key, &raw, at).await;

            if stats.emitted % self.config.checkpoint_interval() == 0 {
                debug!("{}: checkpoint after {} records", name, stats.emitted);
                self.state.persist(sink).await?;
                stats.checkpoints += 1;
            }
        }
        Ok(())
    }

    /// Emit every record, then seed the bookmark with the newest cursor seen
    async fn full_table(
        &self,
        key: Option<&str>,
        sink: &mut dyn OutputSink,
        stats: &mut StreamStats,
    ) -> Result<()> {
        let name = self.def.name;
        let time_extracted = Utc::now();
        let mut newest: Option<(String, DateTime<Utc>)> = None;
        let mut records = self.accessor.records(self.def);

        while let Some(record) = records.try_next().await? {
            if let Some(key) = key {
                match CursorValue::of(&record, key) {
                    CursorValue::Valid { raw, at } => {
                        if newest.as_ref().map_or(true, |(_, max)| at > *max) {
                            newest = Some((raw, at));
                        }
                    }
                    CursorValue::Missing => {
                        warn!("{}: record without '{}', not used for bookmark", name, key);
                    }
                    CursorValue::Malformed(value) => {
                        warn!(
                            "{}: unparseable '{}' value '{}', not used for bookmark",
                            name, key, value
                        );
                    }
                }
            }

            self.emit(record, time_extracted, sink).await?;
            stats.emitted += 1;
        }

        if let (Some(key), Some((raw, at))) = (key, newest) {
            if self.state.advance_bookmark(name, key, &raw, at).await {
                debug!("{}: bookmark {} = {}", name, key, raw);
            }
        }
        Ok(())
    }

    /// Stored bookmark as a timestamp. An unparseable value does not filter.
    async fn starting_bookmark(&self, key: &str) -> Option<DateTime<Utc>> {
        let stored = self.state.get_bookmark(self.def.name, key).await?;
        let parsed = parse_timestamp(&stored);
        if parsed.is_none() {
            warn!(
                "{}: ignoring unparseable bookmark {} = {}",
                self.def.name, key, stored
            );
        }
        parsed
    }

    async fn emit(
        &self,
        mut record: crate::types::Record,
        time_extracted: DateTime<Utc>,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        self.accessor.enrich(self.def, &mut record).await?;
        let record = project_record(record, &self.resolved.fields);
        sink.write(&Message::record(self.def.name, record, time_extracted))
    }
}
