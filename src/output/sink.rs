//! Output sinks
//!
//! Everything the engine emits goes through an [`OutputSink`]. Messages are
//! written in order and never reordered by a sink.

use super::message::Message;
use crate::error::{Error, Result};
use std::io::Write;

/// Destination of emitted messages
pub trait OutputSink: Send {
    /// Write one message
    fn write(&mut self, message: &Message) -> Result<()>;

    /// Flush buffered output at the end of a run
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn write(&mut self, message: &Message) -> Result<()> {
        (**self).write(message)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

// ============================================================================
// JSON lines
// ============================================================================

/// One JSON message per line, flushed after every message
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Sink writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> OutputSink for JsonLinesSink<W> {
    fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)
            .map_err(|e| Error::output(format!("Failed to serialize message: {e}")))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Collects messages in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    messages: Vec<Message>,
    finished: bool,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records of one stream, in emission order
    pub fn records(&self, stream: &str) -> Vec<&crate::types::Record> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Values of all STATE messages, in emission order
    pub fn states(&self) -> Vec<&serde_json::Value> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::State { value } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Was `finish` called
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, message: &Message) -> Result<()> {
        self.messages.push(message.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

// ============================================================================
// Fan-out
// ============================================================================

/// Writes every message to each inner sink, in order
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn OutputSink>>,
}

impl FanoutSink {
    /// Create an empty fan-out
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    #[must_use]
    pub fn with(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of inner sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Has no inner sinks
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl OutputSink for FanoutSink {
    fn write(&mut self, message: &Message) -> Result<()> {
        for sink in &mut self.sinks {
            sink.write(message)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.finish()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
