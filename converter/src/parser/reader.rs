//! Quote-aware CSV record reader.
//!
//! Rules:
//! - a field whose first non-blank character is `"` is quoted and may hold
//!   delimiters and line breaks; `""` inside it is a literal quote
//! - whitespace outside quotes is trimmed, whitespace inside quotes is kept
//! - `\n`, `\r\n` and a lone `\r` end a record outside quotes
//! - blank lines are skipped

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ConvertError, ConvertResult};
use crate::models::{Delimiter, Record};

const QUOTE: char = '"';

/// Parse a whole document into records.
///
/// # Example
/// ```
/// use csvjson::{parse_csv, Delimiter};
///
/// let records = parse_csv("a,\"b,c\"\n1,\"2,3\"\n", Delimiter::Comma).unwrap();
/// assert_eq!(records[0].fields, vec!["a", "b,c"]);
/// assert_eq!(records[1].fields, vec!["1", "2,3"]);
/// ```
pub fn parse_csv(content: &str, delimiter: Delimiter) -> ConvertResult<Vec<Record>> {
    RecordReader::new(content, delimiter).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    /// Nothing but whitespace read so far.
    Start,
    Unquoted,
    Quoted,
    /// After the closing quote of a quoted field.
    Closed,
}

/// Iterator over the records of a document.
///
/// Each item is a complete record; a record is never handed out half-read.
/// After the first error the reader is exhausted.
pub struct RecordReader<'a> {
    chars: Peekable<Chars<'a>>,
    delimiter: char,
    line: usize,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    pub fn new(content: &'a str, delimiter: Delimiter) -> Self {
        Self {
            chars: content.chars().peekable(),
            delimiter: delimiter.as_char(),
            line: 1,
            failed: false,
        }
    }

    /// Read one physical record. Returns `None` for a blank line.
    fn read_record(&mut self) -> ConvertResult<Option<Record>> {
        let start_line = self.line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut state = FieldState::Start;
        let mut quote_line = start_line;

        loop {
            let Some(c) = self.chars.next() else {
                if state == FieldState::Quoted {
                    return Err(ConvertError::MalformedCsv {
                        line: quote_line,
                        reason: "unterminated quoted field".to_string(),
                    });
                }
                break;
            };

            match state {
                FieldState::Quoted => {
                    if c == QUOTE {
                        if self.chars.peek() == Some(&QUOTE) {
                            self.chars.next();
                            field.push(QUOTE);
                        } else {
                            state = FieldState::Closed;
                        }
                    } else {
                        // `\r\n` counts once, on its `\n`.
                        if c == '\n' || (c == '\r' && self.chars.peek() != Some(&'\n')) {
                            self.line += 1;
                        }
                        field.push(c);
                    }
                    continue;
                }
                _ if c == self.delimiter => {
                    fields.push(finish_field(&mut field, state));
                    state = FieldState::Start;
                    continue;
                }
                _ => {}
            }

            match c {
                '\n' => {
                    self.line += 1;
                    break;
                }
                '\r' => {
                    if self.chars.peek() == Some(&'\n') {
                        self.chars.next();
                    }
                    self.line += 1;
                    break;
                }
                _ => {}
            }

            match state {
                FieldState::Start if c == QUOTE => {
                    field.clear();
                    quote_line = self.line;
                    state = FieldState::Quoted;
                }
                FieldState::Start if c.is_whitespace() => field.push(c),
                FieldState::Start | FieldState::Unquoted => {
                    field.push(c);
                    state = FieldState::Unquoted;
                }
                FieldState::Closed if c.is_whitespace() => {}
                FieldState::Closed => {
                    return Err(ConvertError::MalformedCsv {
                        line: self.line,
                        reason: format!("unexpected character '{c}' after closing quote"),
                    });
                }
                FieldState::Quoted => unreachable!("quoted state handled above"),
            }
        }

        let blank = fields.is_empty() && state != FieldState::Closed && field.trim().is_empty();
        if blank {
            return Ok(None);
        }

        fields.push(finish_field(&mut field, state));
        Ok(Some(Record::new(fields, start_line)))
    }
}

/// Take the accumulated field, trimming unless it was quoted.
fn finish_field(field: &mut String, state: FieldState) -> String {
    let value = std::mem::take(field);
    match state {
        FieldState::Closed => value,
        _ => value.trim().to_string(),
    }
}

impl Iterator for RecordReader<'_> {
    type Item = ConvertResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while self.chars.peek().is_some() {
            match self.read_record() {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(content: &str, delimiter: Delimiter) -> Vec<Vec<String>> {
        parse_csv(content, delimiter)
            .unwrap()
            .into_iter()
            .map(|r| r.fields)
            .collect()
    }

    #[test]
    fn test_simple() {
        assert_eq!(
            fields("a,b\n1,2\n3,4\n", Delimiter::Comma),
            vec![vec!["a", "b"], vec!["1", "2"], vec!["3", "4"]]
        );
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(
            fields("a;b\n1;2", Delimiter::Semicolon),
            vec![vec!["a", "b"], vec!["1", "2"]]
        );
    }

    #[test]
    fn test_quoted_delimiter() {
        assert_eq!(
            fields("a,\"b,c\"\n1,\"2,3\"\n", Delimiter::Comma),
            vec![vec!["a", "b,c"], vec!["1", "2,3"]]
        );
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            fields(r#""Say ""Hello""",world"#, Delimiter::Comma),
            vec![vec![r#"Say "Hello""#, "world"]]
        );
    }

    #[test]
    fn test_quoted_newlines() {
        let content = "name,note\nAlice,\"line 1\nline 2\"\nBob,\"a\r\nb\"\n";
        assert_eq!(
            fields(content, Delimiter::Comma),
            vec![
                vec!["name", "note"],
                vec!["Alice", "line 1\nline 2"],
                vec!["Bob", "a\r\nb"],
            ]
        );
    }

    #[test]
    fn test_trimming() {
        assert_eq!(
            fields("  a  ,\tb \n 1 , \"  2  \" \n", Delimiter::Comma),
            vec![vec!["a", "b"], vec!["1", "  2  "]]
        );
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(
            fields("a,,c\n,,\n\"\",x,\n", Delimiter::Comma),
            vec![vec!["a", "", "c"], vec!["", "", ""], vec!["", "x", ""]]
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        let content = "\n\na;b\n\n1;2\n   \n\r\n3;4\n\n";
        assert_eq!(
            fields(content, Delimiter::Semicolon),
            vec![vec!["a", "b"], vec!["1", "2"], vec!["3", "4"]]
        );
    }

    #[test]
    fn test_quoted_empty_line_is_a_record() {
        assert_eq!(fields("\"\"\n", Delimiter::Comma), vec![vec![""]]);
    }

    #[test]
    fn test_crlf_and_lone_cr() {
        assert_eq!(
            fields("a,b\r\n1,2\r3,4\r\n", Delimiter::Comma),
            vec![vec!["a", "b"], vec!["1", "2"], vec!["3", "4"]]
        );
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert_eq!(
            fields("size,label\n5\",5 inch\n", Delimiter::Comma),
            vec![vec!["size", "label"], vec!["5\"", "5 inch"]]
        );
    }

    #[test]
    fn test_other_delimiter_is_literal() {
        assert_eq!(
            fields("a;b\n1,5;2,25\n", Delimiter::Semicolon),
            vec![vec!["a", "b"], vec!["1,5", "2,25"]]
        );
    }

    #[test]
    fn test_tab_delimiter() {
        assert_eq!(
            fields("a\tb\n1\t2\n", Delimiter::Tab),
            vec![vec!["a", "b"], vec!["1", "2"]]
        );
    }

    #[test]
    fn test_record_lines() {
        let records = parse_csv("a,b\n\n1,\"x\ny\"\n2,3\n", Delimiter::Comma).unwrap();
        let lines: Vec<usize> = records.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 3, 5]);
    }

    #[test]
    fn test_record_lines_with_cr_inside_quotes() {
        let lines = |content: &str| -> Vec<usize> {
            parse_csv(content, Delimiter::Comma)
                .unwrap()
                .iter()
                .map(|r| r.line)
                .collect()
        };
        assert_eq!(lines("a,b\r\"x\ry\",2\r3,4\r"), vec![1, 2, 4]);
        assert_eq!(lines("a,b\r\n\"x\r\ny\",2\r\n3,4\r\n"), vec![1, 2, 4]);

        let err = parse_csv("a,b\r\"p\rq\",1\r2,\"oops\r", Delimiter::Comma).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedCsv { line: 4, .. }));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_csv("a,b\n1,2\n3,\"oops\n4,5\n", Delimiter::Comma).unwrap_err();
        match err {
            ConvertError::MalformedCsv { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("unterminated"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_garbage_after_closing_quote() {
        let err = parse_csv("a,b\n\"1\"x,2\n", Delimiter::Comma).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedCsv { line: 2, .. }));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let mut reader = RecordReader::new("a\n\"b", Delimiter::Comma);
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_csv("", Delimiter::Comma).unwrap().is_empty());
        assert!(parse_csv("\n\n", Delimiter::Comma).unwrap().is_empty());
    }
}
