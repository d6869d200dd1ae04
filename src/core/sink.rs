//! Result sink abstraction.
//!
//! Sinks are shared by every execution unit of a run, so methods take `&self`
//! and implementations synchronize internally. Results arrive in completion
//! order, which is not descriptor order.

use parking_lot::Mutex;

use crate::core::{RequestResult, ResourceDescriptor, SinkError};

/// Receiver of replay results.
pub trait ResultSink: Send + Sync {
    /// Write the output header. Called at most once, before any request.
    fn write_header(&self) -> Result<(), SinkError>;

    /// Record the result of one completed request.
    fn write_result(
        &self,
        descriptor: &ResourceDescriptor,
        result: &RequestResult,
    ) -> Result<(), SinkError>;

    /// Flush buffered output once every unit has finished.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink that discards everything. Used when no output is requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ResultSink for NoopSink {
    fn write_header(&self) -> Result<(), SinkError> {
        Ok(())
    }

    fn write_result(
        &self,
        _descriptor: &ResourceDescriptor,
        _result: &RequestResult,
    ) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Event observed by an [`InMemorySink`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// `write_header` was called.
    Header,
    /// `write_result` was called.
    Result {
        /// Path of the replayed descriptor.
        path: String,
        /// Result handed to the sink.
        result: RequestResult,
    },
    /// `flush` was called.
    Flush,
}

/// In-memory sink for testing and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every call received so far.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Results received so far, in arrival order.
    pub fn results(&self) -> Vec<(String, RequestResult)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Result { path, result } => Some((path.clone(), result.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of header writes received.
    pub fn header_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Header))
            .count()
    }
}

impl ResultSink for InMemorySink {
    fn write_header(&self) -> Result<(), SinkError> {
        self.events.lock().push(SinkEvent::Header);
        Ok(())
    }

    fn write_result(
        &self,
        descriptor: &ResourceDescriptor,
        result: &RequestResult,
    ) -> Result<(), SinkError> {
        self.events.lock().push(SinkEvent::Result {
            path: descriptor.path.clone(),
            result: result.clone(),
        });
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.events.lock().push(SinkEvent::Flush);
        Ok(())
    }
}
