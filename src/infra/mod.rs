//! Collaborators around the core: access-log input and result output.

pub mod access_log;
pub mod jmeter;

pub use access_log::{
    extract_resources, normalize_path, parse_access_log, parse_line, parse_lines, LogEntry,
    LogParseError,
};
pub use jmeter::{JmeterCsvSink, JMETER_COLUMNS};
