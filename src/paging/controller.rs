//! Pagination controller: proximity-gated sequential fetching.
//!
//! The controller owns the cursor and a single in-flight flag. Fetches
//! run on a dedicated fetcher thread that owns the [`PageSource`];
//! results come back over a channel and are applied by `poll` on the
//! presentation thread, so cursor and flag mutations stay
//! single-threaded. At most one fetch is ever outstanding, and a
//! proximity trigger arriving while one is pending is dropped, not
//! queued.

use crate::model::FetchError;
use crate::paging::{PageCursor, PageSource, RevisionPage};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Trailing margin, in lines of scroll offset, within which the next
/// page is prefetched.
pub const DEFAULT_PREFETCH_THRESHOLD: usize = 200;

/// Scroll geometry at the moment of a proximity trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    /// Scroll offset of the viewport top, in lines.
    pub offset: usize,
    /// Viewport height in lines.
    pub viewport_height: usize,
    /// Total height of the rendered content in lines.
    pub content_height: usize,
}

impl ViewportState {
    /// Create a viewport state.
    pub fn new(offset: usize, viewport_height: usize, content_height: usize) -> Self {
        Self { offset, viewport_height, content_height }
    }
}

/// Result of one settled fetch, surfaced by `poll`.
#[derive(Debug)]
pub enum PageOutcome {
    /// A page arrived; rows are in remote order, ready to append.
    Loaded(Vec<crate::model::RowContent>),
    /// The fetch failed; cursor and collection are untouched and the
    /// same cursor will be retried on the next trigger.
    Failed(FetchError),
}

type FetchResult = Result<RevisionPage, FetchError>;

/// Incrementally grows the row collection from a [`PageSource`].
pub struct PagingController {
    request_tx: Option<Sender<PageCursor>>,
    response_rx: Receiver<FetchResult>,
    fetcher: Option<JoinHandle<()>>,
    cursor: PageCursor,
    exhausted: bool,
    in_flight: bool,
    prefetch_threshold: usize,
}

impl PagingController {
    /// Spawn the fetcher thread around `source`.
    pub fn new(source: impl PageSource + 'static, prefetch_threshold: usize) -> Self {
        let (request_tx, request_rx) = unbounded::<PageCursor>();
        let (response_tx, response_rx) = unbounded::<FetchResult>();

        let mut source = source;
        let fetcher = thread::spawn(move || {
            for cursor in request_rx.iter() {
                let result = source.fetch(&cursor);
                if response_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self {
            request_tx: Some(request_tx),
            response_rx,
            fetcher: Some(fetcher),
            cursor: PageCursor::start(),
            exhausted: false,
            in_flight: false,
            prefetch_threshold,
        }
    }

    /// Whether a proximity trigger at `viewport` should fetch.
    ///
    /// All three gates must hold: not exhausted, no fetch in flight, and
    /// the viewport bottom within the prefetch threshold of the content
    /// end. An empty collection trivially passes the proximity gate, so
    /// the initial fetch always fires.
    pub fn should_fetch(&self, viewport: &ViewportState) -> bool {
        if self.exhausted || self.in_flight {
            return false;
        }
        viewport.offset + viewport.viewport_height + self.prefetch_threshold
            >= viewport.content_height
    }

    /// Issue a fetch for the current cursor if `should_fetch` holds;
    /// otherwise do nothing. Triggers during an in-flight fetch are
    /// dropped rather than queued.
    pub fn maybe_fetch_next(&mut self, viewport: &ViewportState) {
        if !self.should_fetch(viewport) {
            return;
        }
        let Some(request_tx) = &self.request_tx else {
            return;
        };
        if request_tx.send(self.cursor.clone()).is_ok() {
            self.in_flight = true;
            debug!(cursor = ?self.cursor.token(), "page fetch issued");
        } else {
            warn!("page fetcher thread is gone; fetch dropped");
        }
    }

    /// Apply a settled fetch, if one is ready. Non-blocking.
    ///
    /// On success the cursor is replaced with the page's continuation
    /// token and `exhausted` latches when the page reports no more data.
    /// On failure only the in-flight flag is cleared.
    pub fn poll(&mut self) -> Option<PageOutcome> {
        match self.response_rx.try_recv() {
            Ok(Ok(page)) => {
                self.in_flight = false;
                self.cursor = page.next_cursor;
                self.exhausted = !page.has_more;
                debug!(
                    rows = page.rows.len(),
                    exhausted = self.exhausted,
                    "page fetch succeeded"
                );
                Some(PageOutcome::Loaded(page.rows))
            }
            Ok(Err(error)) => {
                self.in_flight = false;
                warn!(%error, "page fetch failed; cursor retained for retry");
                Some(PageOutcome::Failed(error))
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Whether the source reported that no further pages exist.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Whether a fetch is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// The cursor the next fetch will use.
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// The configured trailing prefetch margin in lines.
    pub fn prefetch_threshold(&self) -> usize {
        self.prefetch_threshold
    }
}

impl Drop for PagingController {
    fn drop(&mut self) {
        self.request_tx.take();
        if let Some(handle) = self.fetcher.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RowContent, UneditedContent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Source that serves scripted pages and counts fetch calls.
    struct ScriptedSource {
        pages: Vec<FetchResult>,
        calls: Arc<AtomicUsize>,
    }

    impl PageSource for ScriptedSource {
        fn fetch(&mut self, _cursor: &PageCursor) -> FetchResult {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.get_mut(call) {
                Some(slot) => std::mem::replace(
                    slot,
                    Err(FetchError::Unavailable { reason: "page already served".to_string() }),
                ),
                None => Err(FetchError::Unavailable { reason: "script exhausted".to_string() }),
            }
        }
    }

    /// Source that blocks until released, for in-flight testing.
    struct GatedSource {
        gate: crossbeam_channel::Receiver<()>,
        calls: Arc<AtomicUsize>,
    }

    impl PageSource for GatedSource {
        fn fetch(&mut self, _cursor: &PageCursor) -> FetchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.recv();
            Ok(page(1, PageCursor::start(), false))
        }
    }

    fn page(rows: usize, next_cursor: PageCursor, has_more: bool) -> RevisionPage {
        RevisionPage {
            rows: (0..rows)
                .map(|i| RowContent::Unedited(UneditedContent { line_count: i + 1 }))
                .collect(),
            next_cursor,
            has_more,
        }
    }

    fn near_end() -> ViewportState {
        ViewportState::new(0, 40, 0)
    }

    fn wait_outcome(controller: &mut PagingController) -> PageOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = controller.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "fetch did not settle in time");
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn scripted(pages: Vec<FetchResult>) -> (PagingController, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource { pages, calls: Arc::clone(&calls) };
        (PagingController::new(source, DEFAULT_PREFETCH_THRESHOLD), calls)
    }

    #[test]
    fn three_pages_then_exhausted() {
        let (mut controller, calls) = scripted(vec![
            Ok(page(10, PageCursor::resume("p1"), true)),
            Ok(page(10, PageCursor::resume("p2"), true)),
            Ok(page(10, PageCursor::resume("p3"), false)),
        ]);

        let mut total_rows = 0;
        for _ in 0..3 {
            controller.maybe_fetch_next(&near_end());
            match wait_outcome(&mut controller) {
                PageOutcome::Loaded(rows) => total_rows += rows.len(),
                PageOutcome::Failed(error) => panic!("unexpected failure: {error}"),
            }
        }

        assert_eq!(total_rows, 30);
        assert!(controller.is_exhausted());

        // A fourth trigger issues no fetch.
        controller.maybe_fetch_next(&near_end());
        thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(controller.poll().is_none());
    }

    #[test]
    fn cursor_advances_with_each_page() {
        let (mut controller, _calls) = scripted(vec![
            Ok(page(1, PageCursor::resume("p1"), true)),
            Ok(page(1, PageCursor::resume("p2"), false)),
        ]);

        assert!(controller.cursor().is_start());
        controller.maybe_fetch_next(&near_end());
        wait_outcome(&mut controller);
        assert_eq!(controller.cursor().token(), Some("p1"));

        controller.maybe_fetch_next(&near_end());
        wait_outcome(&mut controller);
        assert_eq!(controller.cursor().token(), Some("p2"));
    }

    #[test]
    fn back_to_back_triggers_issue_one_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let source = GatedSource { gate: release_rx, calls: Arc::clone(&calls) };
        let mut controller = PagingController::new(source, DEFAULT_PREFETCH_THRESHOLD);

        controller.maybe_fetch_next(&near_end());
        controller.maybe_fetch_next(&near_end());
        assert!(controller.is_in_flight());

        release_tx.send(()).expect("fetcher alive");
        wait_outcome(&mut controller);

        assert_eq!(calls.load(Ordering::SeqCst), 1, "second trigger must be dropped");
        assert!(!controller.is_in_flight());
    }

    #[test]
    fn failure_clears_in_flight_and_keeps_cursor() {
        let (mut controller, _calls) = scripted(vec![
            Err(FetchError::Unavailable { reason: "offline".to_string() }),
            Ok(page(2, PageCursor::resume("p1"), false)),
        ]);

        controller.maybe_fetch_next(&near_end());
        match wait_outcome(&mut controller) {
            PageOutcome::Failed(error) => assert!(error.to_string().contains("offline")),
            PageOutcome::Loaded(_) => panic!("expected failure"),
        }
        assert!(!controller.is_in_flight());
        assert!(!controller.is_exhausted());
        assert!(controller.cursor().is_start(), "failed fetch must not advance the cursor");

        // Retry succeeds with the same cursor.
        controller.maybe_fetch_next(&near_end());
        match wait_outcome(&mut controller) {
            PageOutcome::Loaded(rows) => assert_eq!(rows.len(), 2),
            PageOutcome::Failed(error) => panic!("unexpected failure: {error}"),
        }
        assert_eq!(controller.cursor().token(), Some("p1"));
    }

    #[test]
    fn proximity_gate_respects_threshold() {
        let (controller, _calls) = scripted(Vec::new());

        // Far from the end: no fetch.
        let far = ViewportState::new(0, 40, 1000);
        assert!(!controller.should_fetch(&far));

        // Within the trailing margin: fetch.
        let near = ViewportState::new(1000 - 40 - DEFAULT_PREFETCH_THRESHOLD, 40, 1000);
        assert!(controller.should_fetch(&near));

        // Empty collection: always fetch.
        assert!(controller.should_fetch(&ViewportState::new(0, 40, 0)));
    }

    #[test]
    fn trigger_far_from_end_issues_no_fetch() {
        let (mut controller, calls) = scripted(vec![Ok(page(1, PageCursor::start(), false))]);

        controller.maybe_fetch_next(&ViewportState::new(0, 40, 5000));
        thread::sleep(Duration::from_millis(20));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!controller.is_in_flight());
    }
}
