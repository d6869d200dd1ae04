//! JMeter-compatible CSV result sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::{RequestResult, ResourceDescriptor, ResultSink, SinkError};

/// Column order expected by JMeter's CSV result loader.
pub const JMETER_COLUMNS: [&str; 17] = [
    "timeStamp",
    "elapsed",
    "label",
    "responseCode",
    "responseMessage",
    "threadName",
    "dataType",
    "success",
    "failureMessage",
    "bytes",
    "sentBytes",
    "grpThreads",
    "allThreads",
    "URL",
    "Latency",
    "IdleTime",
    "Connect",
];

/// One CSV row. Field order must match [`JMETER_COLUMNS`].
#[derive(Debug, Serialize)]
struct JmeterRecord<'a> {
    time_stamp: i64,
    elapsed: u64,
    label: &'a str,
    response_code: u16,
    response_message: &'a str,
    thread_name: &'static str,
    data_type: &'static str,
    success: bool,
    failure_message: &'static str,
    bytes: u64,
    sent_bytes: u64,
    grp_threads: u32,
    all_threads: u32,
    url: &'a str,
    latency: u64,
    idle_time: u64,
    connect: u64,
}

impl<'a> JmeterRecord<'a> {
    fn from_result(result: &'a RequestResult) -> Self {
        Self {
            time_stamp: result.start_time.timestamp(),
            elapsed: u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
            label: &result.target_url,
            response_code: result.status_code,
            response_message: &result.reason_phrase,
            thread_name: "Thread Group",
            data_type: "text",
            success: result.success,
            failure_message: "",
            bytes: 0,
            sent_bytes: 0,
            grp_threads: 0,
            all_threads: 1,
            url: &result.target_url,
            latency: 0,
            idle_time: 0,
            connect: 0,
        }
    }
}

/// Writes results as JMeter CSV rows.
pub struct JmeterCsvSink<W: Write> {
    writer: Mutex<csv::Writer<W>>,
}

impl<W: Write> JmeterCsvSink<W> {
    /// Wrap an arbitrary writer.
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl JmeterCsvSink<BufWriter<File>> {
    /// Create (or truncate) `path` and write to it.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> ResultSink for JmeterCsvSink<W> {
    fn write_header(&self) -> Result<(), SinkError> {
        self.writer.lock().write_record(JMETER_COLUMNS)?;
        Ok(())
    }

    fn write_result(
        &self,
        _descriptor: &ResourceDescriptor,
        result: &RequestResult,
    ) -> Result<(), SinkError> {
        self.writer
            .lock()
            .serialize(JmeterRecord::from_result(result))?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().flush()?;
        Ok(())
    }
}
