//! Engine types
//!
//! Configuration and statistics for the sync engine.

/// Records emitted between periodic checkpoints of an incremental stream
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Emitted records between STATE checkpoints in INCREMENTAL mode, never 0
    checkpoint_interval: usize,
    /// Streams whose bookmarks are dropped before the run
    pub reset_streams: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            reset_streams: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set checkpoint interval (at least 1)
    #[must_use]
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval.max(1);
        self
    }

    /// Emitted records between STATE checkpoints
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    /// Drop the bookmarks of `stream` before syncing
    #[must_use]
    pub fn with_reset_stream(mut self, stream: impl Into<String>) -> Self {
        self.reset_streams.push(stream.into());
        self
    }
}

/// Statistics for one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Stream name
    pub name: String,
    /// Records written to the sink
    pub emitted: usize,
    /// Records at or before the bookmark
    pub skipped: usize,
    /// Periodic checkpoints written
    pub checkpoints: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl StreamStats {
    /// Create stats for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Per-stream statistics, in sync order
    pub streams: Vec<StreamStats>,
    /// Selected streams that were skipped as unknown
    pub streams_skipped: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished stream
    pub fn add_stream(&mut self, stats: StreamStats) {
        self.streams.push(stats);
    }

    /// Count a skipped stream
    pub fn add_skipped_stream(&mut self) {
        self.streams_skipped += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// Streams synced
    pub fn streams_synced(&self) -> usize {
        self.streams.len()
    }

    /// Records emitted across all streams
    pub fn records_emitted(&self) -> usize {
        self.streams.iter().map(|s| s.emitted).sum()
    }

    /// Records skipped across all streams
    pub fn records_skipped(&self) -> usize {
        self.streams.iter().map(|s| s.skipped).sum()
    }

    /// Stats of one stream
    pub fn stream(&self, name: &str) -> Option<&StreamStats> {
        self.streams.iter().find(|s| s.name == name)
    }
}
