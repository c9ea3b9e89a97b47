//! JSONL-backed page source.
//!
//! One row content record per line; pages are served as fixed-size
//! windows over the file order. Backs the demo binary and the
//! acceptance tests, and doubles as the reference implementation of the
//! cursor contract: the continuation token is the start offset of the
//! next window, so retrying a cursor always yields the identical page.

use crate::model::{FetchError, RowContent};
use crate::paging::{PageCursor, PageSource, RevisionPage};
use std::path::Path;

/// Page source over an in-memory row list loaded from a JSONL fixture.
#[derive(Debug)]
pub struct FixturePageSource {
    rows: Vec<RowContent>,
    page_size: usize,
}

impl FixturePageSource {
    /// Load a fixture file: one JSON row-content object per line, blank
    /// lines ignored.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Io` if the file cannot be read and
    /// `FetchError::Decode` (with a 1-based line number) for the first
    /// malformed line.
    pub fn from_path(path: impl AsRef<Path>, page_size: usize) -> Result<Self, FetchError> {
        let contents = std::fs::read_to_string(path)?;
        let mut rows = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: RowContent =
                serde_json::from_str(line).map_err(|error| FetchError::Decode {
                    line: number + 1,
                    message: error.to_string(),
                })?;
            rows.push(row);
        }
        Ok(Self::from_rows(rows, page_size))
    }

    /// Wrap an in-memory row list.
    pub fn from_rows(rows: Vec<RowContent>, page_size: usize) -> Self {
        Self { rows, page_size: page_size.max(1) }
    }

    /// Total number of rows in the fixture.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the fixture holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn decode_cursor(cursor: &PageCursor) -> Result<usize, FetchError> {
        match cursor.token() {
            None => Ok(0),
            Some(token) => token.parse().map_err(|_| FetchError::Decode {
                line: 0,
                message: format!("invalid continuation token '{token}'"),
            }),
        }
    }
}

impl PageSource for FixturePageSource {
    fn fetch(&mut self, cursor: &PageCursor) -> Result<RevisionPage, FetchError> {
        let start = Self::decode_cursor(cursor)?.min(self.rows.len());
        let end = start.saturating_add(self.page_size).min(self.rows.len());
        let rows = self.rows[start..end].to_vec();
        Ok(RevisionPage {
            rows,
            next_cursor: PageCursor::resume(end.to_string()),
            has_more: end < self.rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UneditedContent;
    use std::io::Write;

    fn unedited(n: usize) -> RowContent {
        RowContent::Unedited(UneditedContent { line_count: n })
    }

    #[test]
    fn pages_partition_the_fixture_in_order() {
        let mut source = FixturePageSource::from_rows((1..=7).map(unedited).collect(), 3);

        let first = source.fetch(&PageCursor::start()).expect("page");
        assert_eq!(first.rows.len(), 3);
        assert!(first.has_more);

        let second = source.fetch(&first.next_cursor).expect("page");
        assert_eq!(second.rows.len(), 3);
        assert!(second.has_more);

        let third = source.fetch(&second.next_cursor).expect("page");
        assert_eq!(third.rows.len(), 1);
        assert!(!third.has_more);

        let spans: Vec<usize> = [first.rows, second.rows, third.rows]
            .into_iter()
            .flatten()
            .map(|row| match row {
                RowContent::Unedited(u) => u.line_count,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(spans, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn same_cursor_yields_the_identical_page() {
        let mut source = FixturePageSource::from_rows((1..=5).map(unedited).collect(), 2);
        let cursor = PageCursor::resume("2");

        let once = source.fetch(&cursor).expect("page");
        let again = source.fetch(&cursor).expect("page");
        assert_eq!(once.rows, again.rows);
        assert_eq!(once.next_cursor, again.next_cursor);
    }

    #[test]
    fn corrupt_token_is_a_decode_error() {
        let mut source = FixturePageSource::from_rows(vec![unedited(1)], 2);
        let result = source.fetch(&PageCursor::resume("not-a-number"));
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[test]
    fn empty_fixture_serves_one_empty_terminal_page() {
        let mut source = FixturePageSource::from_rows(Vec::new(), 10);
        let page = source.fetch(&PageCursor::start()).expect("page");
        assert!(page.rows.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn from_path_parses_jsonl_lines() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, r#"{{"kind":"unedited","line_count":9}}"#).expect("write");
        writeln!(file).expect("write");
        writeln!(
            file,
            r#"{{"kind":"context","heading":"Intro","lines":["a"]}}"#
        )
        .expect("write");

        let source = FixturePageSource::from_path(file.path(), 10).expect("fixture");
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn from_path_reports_line_of_first_bad_record() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, r#"{{"kind":"unedited","line_count":9}}"#).expect("write");
        writeln!(file, "not json").expect("write");

        let error = FixturePageSource::from_path(file.path(), 10).unwrap_err();
        match error {
            FetchError::Decode { line, .. } => assert_eq!(line, 2),
            other => panic!("expected decode error, got {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error =
            FixturePageSource::from_path("/nonexistent/fixture.jsonl", 10).unwrap_err();
        assert!(matches!(error, FetchError::Io(_)));
    }
}
