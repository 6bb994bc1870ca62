//! Parquet export
//!
//! [`ParquetSink`] writes one `<stream>.parquet` file per stream next to the
//! regular message output. Records are buffered and written in batches; the
//! file is closed when the next stream's SCHEMA arrives or at `finish`.

use super::columns::{arrow_schema, records_to_batch};
use super::message::Message;
use super::sink::OutputSink;
use crate::error::{Error, Result};
use crate::types::Record;
use arrow::datatypes::Schema;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024,
            batch_size: 1000,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Number of records buffered before a batch is written
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Get batch size
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Parquet file writer for a single stream
pub struct ParquetWriter {
    writer: ArrowWriter<File>,
    schema: Arc<Schema>,
    path: PathBuf,
    pending: Vec<Record>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Create the file at `path`
    pub fn new(path: impl AsRef<Path>, schema: Schema, config: &ParquetWriterConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| {
            Error::output(format!("Failed to create {}: {e}", path.display()))
        })?;

        let schema = Arc::new(schema);
        let writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(config.build_properties()))
            .map_err(|e| Error::output(format!("Failed to create Parquet writer: {e}")))?;

        Ok(Self {
            writer,
            schema,
            path,
            pending: Vec::new(),
            rows_written: 0,
        })
    }

    /// Buffer one record
    pub fn push(&mut self, record: Record) {
        self.pending.push(record);
    }

    /// Number of buffered records
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Write buffered records as one batch
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = records_to_batch(&self.pending, &self.schema)?;
        self.writer
            .write(&batch)
            .map_err(|e| Error::output(format!("Failed to write batch: {e}")))?;
        self.rows_written += batch.num_rows();
        self.pending.clear();
        Ok(())
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush, close the writer and finalize the file
    pub fn close(mut self) -> Result<usize> {
        self.flush()?;
        let rows = self.rows_written;
        self.writer
            .close()
            .map_err(|e| Error::output(format!("Failed to close Parquet writer: {e}")))?;
        debug!("Closed {} ({} rows)", self.path.display(), rows);
        Ok(rows)
    }
}

/// Sink writing each stream to a Parquet file in a directory
pub struct ParquetSink {
    dir: PathBuf,
    config: ParquetWriterConfig,
    current: Option<(String, ParquetWriter)>,
}

impl ParquetSink {
    /// Create a sink writing into `dir`, creating it when missing
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(dir, ParquetWriterConfig::default())
    }

    /// Create a sink with a custom writer config
    pub fn with_config(dir: impl Into<PathBuf>, config: ParquetWriterConfig) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            config,
            current: None,
        })
    }

    /// Path of the file for `stream`
    pub fn path_for(&self, stream: &str) -> PathBuf {
        self.dir.join(format!("{stream}.parquet"))
    }

    fn close_current(&mut self) -> Result<()> {
        if let Some((stream, writer)) = self.current.take() {
            let rows = writer.close()?;
            info!("{}: wrote {} rows to parquet", stream, rows);
        }
        Ok(())
    }
}

impl OutputSink for ParquetSink {
    fn write(&mut self, message: &Message) -> Result<()> {
        match message {
            Message::Schema { stream, schema, .. } => {
                self.close_current()?;
                let writer =
                    ParquetWriter::new(self.path_for(stream), arrow_schema(schema)?, &self.config)?;
                self.current = Some((stream.clone(), writer));
            }
            Message::Record { stream, record, .. } => {
                let batch_size = self.config.batch_size;
                match &mut self.current {
                    Some((current, writer)) if current == stream => {
                        writer.push(record.clone());
                        if writer.pending() >= batch_size {
                            writer.flush()?;
                        }
                    }
                    _ => {
                        return Err(Error::output(format!(
                            "Record for '{stream}' arrived before its schema"
                        )))
                    }
                }
            }
            Message::State { .. } => {}
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.close_current()
    }
}

impl std::fmt::Debug for ParquetSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetSink")
            .field("dir", &self.dir)
            .field("config", &self.config)
            .field("current", &self.current.as_ref().map(|(s, _)| s))
            .finish()
    }
}
