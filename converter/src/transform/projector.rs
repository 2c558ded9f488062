//! Record to JSON object projection.
//!
//! The header is the only source of keys. Short rows are padded with `""`,
//! long rows lose their extra trailing values; both are reported as soft
//! warnings and never abort the conversion.

use serde_json::Value;

use crate::api::logs::{LogBroadcaster, LogEntry, LOG_BROADCASTER};
use crate::models::{Header, JsonObject, Record, RowMismatch};

/// Objects plus the rows whose width did not match the header.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub objects: Vec<JsonObject>,
    pub mismatches: Vec<RowMismatch>,
}

/// Project data records onto the header, logging mismatched rows.
pub fn project(header: &Header, records: &[Record]) -> Vec<JsonObject> {
    let projection = project_with_report(header, records);
    log_mismatches(&projection.mismatches);
    projection.objects
}

/// Project data records onto the header without logging.
pub fn project_with_report(header: &Header, records: &[Record]) -> Projection {
    let mut projection = Projection {
        objects: Vec::with_capacity(records.len()),
        mismatches: Vec::new(),
    };

    for record in records {
        if record.len() != header.len() {
            projection.mismatches.push(RowMismatch {
                line: record.line,
                expected: header.len(),
                found: record.len(),
            });
        }
        projection.objects.push(project_record(header, record));
    }

    projection
}

/// Log a count of mismatched rows, then one indented warning per row.
///
/// Nothing is logged when every row matched.
pub fn log_mismatches(mismatches: &[RowMismatch]) {
    report_mismatches(&LOG_BROADCASTER, mismatches);
}

fn report_mismatches(logs: &LogBroadcaster, mismatches: &[RowMismatch]) {
    if mismatches.is_empty() {
        return;
    }
    logs.log(LogEntry::warning(format!(
        "{} row(s) do not match the header width",
        mismatches.len()
    )));
    for mismatch in mismatches {
        logs.log(LogEntry::warning(mismatch.to_string()).with_indent(1));
    }
}

fn project_record(header: &Header, record: &Record) -> JsonObject {
    let mut obj = JsonObject::new();
    for (i, name) in header.names().iter().enumerate() {
        let value = record.get(i).unwrap_or("");
        obj.insert(name.clone(), Value::String(value.to_string()));
    }
    obj
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str], line: usize) -> Record {
        Record::new(fields.iter().map(|s| s.to_string()).collect(), line)
    }

    fn header(names: &[&str]) -> Header {
        Header::from_record(record(names, 1)).unwrap()
    }

    #[test]
    fn test_exact_width() {
        let h = header(&["name", "age"]);
        let rows = project(&h, &[record(&["Alice", "30"], 2), record(&["Bob", "25"], 3)]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Alice");
        assert_eq!(rows[0]["age"], "30");
        assert_eq!(rows[1]["name"], "Bob");
    }

    #[test]
    fn test_keys_follow_header_order() {
        let h = header(&["zeta", "alpha", "Mid"]);
        let rows = project(&h, &[record(&["1", "2", "3"], 2)]);
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "Mid"]);
    }

    #[test]
    fn test_short_row_padded() {
        let h = header(&["a", "b", "c"]);
        let projection = project_with_report(&h, &[record(&["1"], 2)]);

        assert_eq!(projection.objects[0]["a"], "1");
        assert_eq!(projection.objects[0]["b"], "");
        assert_eq!(projection.objects[0]["c"], "");
        assert_eq!(
            projection.mismatches,
            vec![RowMismatch { line: 2, expected: 3, found: 1 }]
        );
    }

    #[test]
    fn test_long_row_truncated() {
        let h = header(&["a", "b"]);
        let projection = project_with_report(&h, &[record(&["1", "2", "3", "4"], 7)]);

        assert_eq!(projection.objects[0].len(), 2);
        assert_eq!(projection.objects[0]["b"], "2");
        assert!(projection.mismatches[0].is_truncated());
        assert_eq!(projection.mismatches[0].line, 7);
    }

    #[test]
    fn test_values_stay_strings() {
        let h = header(&["n", "flag", "none"]);
        let rows = project(&h, &[record(&["42", "true", "null"], 2)]);

        assert_eq!(rows[0]["n"], Value::String("42".into()));
        assert_eq!(rows[0]["flag"], Value::String("true".into()));
        assert_eq!(rows[0]["none"], Value::String("null".into()));
    }

    #[test]
    fn test_mismatch_report_format() {
        let logs = LogBroadcaster::new();
        logs.set_echo(false);
        let mut rx = logs.subscribe();

        let h = header(&["a", "b"]);
        let projection = project_with_report(&h, &[record(&["1"], 2), record(&["1", "2", "3"], 3)]);
        report_mismatches(&logs, &projection.mismatches);

        let summary = rx.try_recv().unwrap();
        assert_eq!(summary.message, "2 row(s) do not match the header width");
        assert_eq!(summary.indent, 0);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.message, projection.mismatches[0].to_string());
        assert_eq!(first.indent, 1);
        let second = rx.try_recv().unwrap();
        assert!(second.message.starts_with("Line 3:"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_no_mismatch_logs_nothing() {
        let logs = LogBroadcaster::new();
        logs.set_echo(false);
        let mut rx = logs.subscribe();

        report_mismatches(&logs, &[]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_no_records() {
        let h = header(&["a"]);
        let projection = project_with_report(&h, &[]);
        assert!(projection.objects.is_empty());
        assert!(projection.mismatches.is_empty());
    }
}
