//! Apache combined-log parsing and descriptor extraction.
//!
//! Format: `%h %l %u %t "%m %U %H" %>s %b "%{Referer}i" "%{User-Agent}i"`.

use std::io::BufRead;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use thiserror::Error;

use crate::core::ResourceDescriptor;

/// `strftime` layout of `%t` without the brackets.
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^(?P<host>\S+) (?P<ident>\S+) (?P<user>\S+) \[(?P<time>[^\]]+)\] "#,
        r#""(?P<request>(?:[^"\\]|\\.)*)" (?P<status>\d{3}|-) (?P<bytes>\d+|-) "#,
        r#""(?P<referer>(?:[^"\\]|\\.)*)" "(?P<agent>(?:[^"\\]|\\.)*)"\s*$"#,
    ))
    .expect("access log pattern is valid")
});

static URL_BASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[htps]+://(www)?[\w.]+/").expect("url base pattern is valid"));

/// Errors that abort a replay before any request is made.
#[derive(Debug, Error)]
pub enum LogParseError {
    /// The line does not match the combined log format.
    #[error("line {line_number}: malformed log entry: {line}")]
    Malformed {
        /// 1-based line number.
        line_number: usize,
        /// Offending line.
        line: String,
    },
    /// The `%t` field could not be parsed.
    #[error("line {line_number}: invalid timestamp {value:?}: {source}")]
    Timestamp {
        /// 1-based line number.
        line_number: usize,
        /// Raw timestamp text.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: chrono::ParseError,
    },
    /// Reading the log failed.
    #[error("failed to read log: {0}")]
    Io(#[from] std::io::Error),
}

/// One parsed access-log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// `%h`
    pub remote_host: String,
    /// `%l`
    pub ident: Option<String>,
    /// `%u`
    pub user: Option<String>,
    /// `%t`
    pub request_time: DateTime<FixedOffset>,
    /// `%m`
    pub method: String,
    /// `%U`, including any scheme/host the client sent.
    pub request_uri: String,
    /// `%H`
    pub protocol: String,
    /// `%>s`
    pub status: Option<u16>,
    /// `%b`
    pub bytes: Option<u64>,
    /// `%{Referer}i`
    pub referer: Option<String>,
    /// `%{User-Agent}i`
    pub user_agent: Option<String>,
    /// The line as read.
    pub raw: String,
}

fn dash_is_none(value: &str) -> Option<String> {
    (value != "-").then(|| value.to_string())
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a single log line. `line_number` is only used for error reporting.
pub fn parse_line(line: &str, line_number: usize) -> Result<LogEntry, LogParseError> {
    let malformed = || LogParseError::Malformed {
        line_number,
        line: line.to_string(),
    };
    let caps = LINE_RE.captures(line).ok_or_else(malformed)?;

    let time = &caps["time"];
    let request_time = DateTime::parse_from_str(time, TIMESTAMP_FORMAT).map_err(|source| {
        LogParseError::Timestamp {
            line_number,
            value: time.to_string(),
            source,
        }
    })?;

    let request = unescape(&caps["request"]);
    let mut parts = request.split(' ').filter(|p| !p.is_empty());
    let (Some(method), Some(request_uri), Some(protocol), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    Ok(LogEntry {
        remote_host: caps["host"].to_string(),
        ident: dash_is_none(&caps["ident"]),
        user: dash_is_none(&caps["user"]),
        request_time,
        method: method.to_string(),
        request_uri: request_uri.to_string(),
        protocol: protocol.to_string(),
        status: caps["status"].parse().ok(),
        bytes: caps["bytes"].parse().ok(),
        referer: dash_is_none(&unescape(&caps["referer"])),
        user_agent: dash_is_none(&unescape(&caps["agent"])),
        raw: line.to_string(),
    })
}

/// Parse every line of `reader`. Blank lines are skipped; any other bad line
/// fails the whole log.
pub fn parse_lines<R: BufRead>(reader: R) -> Result<Vec<LogEntry>, LogParseError> {
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        entries.push(parse_line(line, index + 1)?);
    }
    Ok(entries)
}

/// Rewrite a leading `scheme://[www]host/` to `/`.
pub fn normalize_path(uri: &str) -> String {
    URL_BASE_RE.replace(uri, "/").into_owned()
}

/// Turn parsed entries into descriptors, delays relative to the first entry.
///
/// Entries stamped earlier than the first one get a zero delay.
pub fn extract_resources(entries: &[LogEntry]) -> Vec<ResourceDescriptor> {
    let Some(first) = entries.first() else {
        return Vec::new();
    };
    let start = first.request_time;
    entries
        .iter()
        .map(|entry| ResourceDescriptor {
            path: normalize_path(&entry.request_uri),
            method: entry.method.clone(),
            delay: (entry.request_time - start).to_std().unwrap_or(Duration::ZERO),
            raw_entry: entry.raw.clone(),
        })
        .collect()
}

/// Parse a whole access log into replay descriptors.
pub fn parse_access_log<R: BufRead>(reader: R) -> Result<Vec<ResourceDescriptor>, LogParseError> {
    let entries = parse_lines(reader)?;
    tracing::debug!("parsed {} access log entries", entries.len());
    Ok(extract_resources(&entries))
}
