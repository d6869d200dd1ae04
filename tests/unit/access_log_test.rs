//! Tests for access log extraction

use std::time::Duration;

use time_machine::infra::{extract_resources, parse_access_log, parse_lines, LogParseError};

const LOG: &str = r#"187.1.2.3 - - [05/Mar/2020:10:00:00 -0300] "GET https://www.scielo.br/scielo.php?script=sci_arttext HTTP/1.1" 200 5120 "-" "Mozilla/5.0"
187.1.2.4 - - [05/Mar/2020:10:00:02 -0300] "POST /api/v1/search HTTP/1.1" 201 12 "https://www.scielo.br/" "Mozilla/5.0"
187.1.2.5 - - [05/Mar/2020:10:00:05 -0300] "GET /j/rbef/ HTTP/1.1" 301 - "-" "Googlebot/2.1"
"#;

#[test]
fn test_delays_relative_to_first_entry() {
    let resources = parse_access_log(LOG.as_bytes()).unwrap();
    let delays: Vec<Duration> = resources.iter().map(|r| r.delay).collect();
    assert_eq!(
        delays,
        vec![Duration::ZERO, Duration::from_secs(2), Duration::from_secs(5)]
    );
}

#[test]
fn test_descriptors_keep_log_order_and_method() {
    let resources = parse_access_log(LOG.as_bytes()).unwrap();
    let paths: Vec<&str> = resources.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/scielo.php?script=sci_arttext", "/api/v1/search", "/j/rbef/"]
    );
    assert_eq!(resources[1].method, "POST");
    assert!(resources[2].raw_entry.contains("Googlebot"));
}

#[test]
fn test_delays_across_timezones() {
    let log = concat!(
        r#"1.1.1.1 - - [05/Mar/2020:10:00:00 -0300] "GET /a HTTP/1.1" 200 1 "-" "-""#,
        "\n",
        r#"1.1.1.1 - - [05/Mar/2020:13:00:03 +0000] "GET /b HTTP/1.1" 200 1 "-" "-""#,
    );
    let resources = parse_access_log(log.as_bytes()).unwrap();
    assert_eq!(resources[1].delay, Duration::from_secs(3));
}

#[test]
fn test_malformed_line_reports_position() {
    let log = format!("{LOG}garbage line\n");
    match parse_access_log(log.as_bytes()) {
        Err(LogParseError::Malformed { line_number, line }) => {
            assert_eq!(line_number, 4);
            assert_eq!(line, "garbage line");
        }
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[test]
fn test_extract_from_no_entries() {
    assert!(extract_resources(&[]).is_empty());
}

#[test]
fn test_entries_carry_status_and_bytes() {
    let entries = parse_lines(LOG.as_bytes()).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].status, Some(301));
    assert_eq!(entries[2].bytes, None);
    assert_eq!(entries[1].referer.as_deref(), Some("https://www.scielo.br/"));
}
