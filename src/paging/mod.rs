//! Cursor-based pagination over a remote revision history.
//!
//! The remote source is abstracted behind [`PageSource`]; the controller
//! in [`controller`] owns the cursor and the single in-flight flag, and
//! the fixture source in [`fixture`] backs the demo binary and tests.

pub mod controller;
pub mod cursor;
pub mod fixture;

pub use controller::{PageOutcome, PagingController, ViewportState, DEFAULT_PREFETCH_THRESHOLD};
pub use cursor::PageCursor;
pub use fixture::FixturePageSource;

use crate::model::{FetchError, RowContent};

/// One page of rows fetched from the remote history.
#[derive(Debug, Clone)]
pub struct RevisionPage {
    /// Rows in remote order. The source is the single source of truth
    /// for ordering; the controller never reorders or deduplicates.
    pub rows: Vec<RowContent>,
    /// Continuation token for the page after this one.
    pub next_cursor: PageCursor,
    /// Whether further pages exist. `false` permanently exhausts the
    /// controller.
    pub has_more: bool,
}

/// A remote, cursor-addressed page source.
///
/// Implementations must be safe to retry with the same cursor: a failed
/// fetch leaves the controller's cursor untouched and the identical
/// request will be issued again on the next proximity trigger.
pub trait PageSource: Send {
    /// Fetch the page identified by `cursor`.
    fn fetch(&mut self, cursor: &PageCursor) -> Result<RevisionPage, FetchError>;
}
