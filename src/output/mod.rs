//! Output module
//!
//! Emits the sync as Singer-style messages.
//!
//! # Overview
//!
//! - [`Message`]: SCHEMA, RECORD and STATE messages
//! - [`OutputSink`]: where messages go (stdout JSON lines, memory, fan-out)
//! - [`ParquetSink`]: optional per-stream Parquet files

mod columns;
mod message;
mod sink;
mod writer;

pub use columns::{arrow_schema, property_type, records_to_batch};
pub use message::Message;
pub use sink::{FanoutSink, JsonLinesSink, MemorySink, OutputSink};
pub use writer::{ParquetSink, ParquetWriter, ParquetWriterConfig};

#[cfg(test)]
mod tests;
