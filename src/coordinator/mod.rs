//! List coordination.
//!
//! The coordinator is the single-threaded presentation context: it owns
//! the row collection, the size cache, and the height index; serializes
//! relayout requests into the engine one at a time; applies settled page
//! fetches; and forwards every observable change to the
//! [`PresentationHost`]. Nothing else writes row layout attributes, which
//! is what upholds the single-writer invariant on rows.

use crate::layout::{
    HeightIndex, LayoutCompletion, LayoutEngine, LayoutUpdate, SizeCache, DEFAULT_CHUNK_SIZE,
};
use crate::model::{DiffRow, FetchError, Generation, LayoutContext, RowContent, RowIndex};
use crate::paging::{
    PageOutcome, PageSource, PagingController, ViewportState, DEFAULT_PREFETCH_THRESHOLD,
};
use std::collections::VecDeque;
use std::ops::Range;
use tracing::debug;

/// Callbacks the presentation layer receives from the core.
///
/// Delivery is always on the thread driving the coordinator, and each
/// callback names the region that changed so the host can re-render only
/// that region. The host must not assume the re-render itself happens
/// synchronously.
pub trait PresentationHost {
    /// A full relayout pass finished and the collection was committed.
    fn on_layout_complete(&mut self, update: &LayoutUpdate);

    /// Rows in `range` were appended by pagination.
    fn on_rows_appended(&mut self, range: Range<usize>);

    /// The row at `index` flipped its collapsed/expanded presentation;
    /// only that row needs relayout.
    fn on_row_expansion_changed(&mut self, index: RowIndex);

    /// A page fetch failed. The collection and cursor are untouched and
    /// the fetch retries on the next proximity trigger.
    fn on_fetch_failed(&mut self, error: &FetchError);
}

/// Tuning knobs for a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Rows per concurrent layout chunk.
    pub chunk_size: usize,
    /// Layout worker threads; 0 means one per available core.
    pub worker_threads: usize,
    /// Trailing prefetch margin in lines.
    pub prefetch_threshold: usize,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            worker_threads: 0,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
        }
    }
}

struct PendingRelayout {
    seq: u64,
    update: LayoutUpdate,
    target: LayoutContext,
}

/// Owns the row collection and orchestrates the engine and the pager.
pub struct ListCoordinator<H: PresentationHost> {
    host: H,
    rows: Vec<DiffRow>,
    cache: SizeCache,
    heights: HeightIndex,
    engine: LayoutEngine,
    pager: PagingController,
    context: LayoutContext,
    generation: Generation,
    chunk_size: usize,
    pending: Option<PendingRelayout>,
    queued: VecDeque<LayoutUpdate>,
}

impl<H: PresentationHost> ListCoordinator<H> {
    /// Create a coordinator over an empty collection.
    ///
    /// `context` is the style and width rows will first be measured
    /// against; `source` feeds pagination.
    pub fn new(
        host: H,
        source: impl PageSource + 'static,
        context: LayoutContext,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            host,
            rows: Vec::new(),
            cache: SizeCache::new(),
            heights: HeightIndex::new(),
            engine: LayoutEngine::new(options.worker_threads),
            pager: PagingController::new(source, options.prefetch_threshold),
            context,
            generation: Generation::first(),
            chunk_size: options.chunk_size.max(1),
            pending: None,
            queued: VecDeque::new(),
        }
    }

    /// Replace the collection wholesale and measure it at `width`.
    ///
    /// Bumps the generation so completions targeting the old collection
    /// are discarded, and drops every cache entry (structural change).
    pub fn reset(&mut self, contents: Vec<RowContent>, width: u16) {
        self.generation = self.generation.next();
        self.pending = None;
        self.queued.clear();
        self.cache.invalidate_all();
        let (font, theme) = (self.context.font, self.context.theme);
        self.rows = contents
            .into_iter()
            .map(|content| DiffRow::styled(content, font, theme))
            .collect();
        self.heights.rebuild(self.rows.iter().map(DiffRow::height));
        self.request_relayout(LayoutUpdate::InitialLoad { width });
    }

    /// Request a relayout of the whole collection.
    ///
    /// Requests are serialized: while one recompute is in flight, later
    /// requests queue behind it, and a newer width or style change
    /// replaces a queued one of the same kind so rapid-fire events
    /// coalesce into the latest value before any fan-out begins.
    pub fn request_relayout(&mut self, update: LayoutUpdate) {
        if update.is_full_pass() {
            let kind = std::mem::discriminant(&update);
            self.queued.retain(|queued| std::mem::discriminant(queued) != kind);
        }
        self.queued.push_back(update);
        self.pump();
    }

    /// Flip the collapsed/expanded presentation of the row at `index`.
    ///
    /// Applied synchronously when no recompute is in flight; otherwise
    /// queued behind it so the toggle and the engine never write the
    /// same row concurrently. Non-collapsible rows and out-of-range
    /// indexes are ignored.
    pub fn toggle_expansion(&mut self, index: RowIndex) {
        self.request_relayout(LayoutUpdate::ExpansionToggled { index });
    }

    /// Feed a scroll position to the pagination proximity check.
    pub fn on_scroll(&mut self, offset: usize, viewport_height: usize) {
        let viewport = ViewportState::new(offset, viewport_height, self.heights.total());
        self.pager.maybe_fetch_next(&viewport);
    }

    /// React to a memory-pressure signal by dropping all cached sizes.
    pub fn on_memory_pressure(&mut self) {
        debug!(entries = self.cache.len(), "memory pressure: clearing size cache");
        self.cache.invalidate_all();
    }

    /// Drain settled engine completions and page fetches.
    ///
    /// Call from the presentation thread's event loop. Returns whether
    /// anything was applied.
    pub fn poll(&mut self) -> bool {
        let mut progressed = false;
        while let Ok(completion) = self.engine.completions().try_recv() {
            progressed = true;
            self.handle_completion(completion);
        }
        while let Some(outcome) = self.pager.poll() {
            progressed = true;
            match outcome {
                PageOutcome::Loaded(contents) => self.append_rows(contents),
                PageOutcome::Failed(error) => self.host.on_fetch_failed(&error),
            }
        }
        progressed
    }

    /// The rows in document order.
    pub fn rows(&self) -> &[DiffRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The layout context the committed collection reflects.
    pub fn context(&self) -> LayoutContext {
        self.context
    }

    /// Total content height in lines.
    pub fn total_height(&self) -> usize {
        self.heights.total()
    }

    /// The row containing the given line offset.
    pub fn row_at_offset(&self, offset: usize) -> Option<RowIndex> {
        self.heights.row_at_offset(offset).map(RowIndex::new)
    }

    /// Whether a relayout is in flight or queued.
    pub fn is_relayout_pending(&self) -> bool {
        self.pending.is_some() || !self.queued.is_empty()
    }

    /// Whether pagination reported the history exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.pager.is_exhausted()
    }

    /// Whether a page fetch is outstanding.
    pub fn is_fetch_in_flight(&self) -> bool {
        self.pager.is_in_flight()
    }

    /// Whether no layout or fetch work is outstanding.
    pub fn is_idle(&self) -> bool {
        !self.is_relayout_pending() && !self.pager.is_in_flight()
    }

    /// The presentation host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the presentation host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn pump(&mut self) {
        while self.pending.is_none() {
            let Some(update) = self.queued.pop_front() else {
                break;
            };
            match update {
                LayoutUpdate::ExpansionToggled { index } => self.apply_toggle(index),
                update => self.dispatch(update),
            }
        }
    }

    fn dispatch(&mut self, update: LayoutUpdate) {
        let target = self.target_context(&update);
        // The cache is consulted before any fan-out begins; a hit applies
        // the sizes as a single sequential step and completes on the spot.
        let hit = self.cache.lookup(&target, self.rows.len()).map(<[_]>::to_vec);
        if let Some(sizes) = hit {
            debug!(?target, "size cache hit; skipping fan-out");
            for (row, row_sizes) in self.rows.iter_mut().zip(sizes) {
                row.install_layout(target, row_sizes);
            }
            self.commit(target, &update);
            return;
        }
        let snapshot = self.rows.clone();
        let seq = self
            .engine
            .recompute(snapshot, update.clone(), self.chunk_size, self.generation);
        self.pending = Some(PendingRelayout { seq, update, target });
    }

    fn handle_completion(&mut self, completion: LayoutCompletion) {
        let expected = self.pending.as_ref().map(|pending| pending.seq);
        if completion.generation != self.generation || expected != Some(completion.seq) {
            debug!(
                seq = completion.seq,
                generation = completion.generation.get(),
                "discarding stale layout completion"
            );
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        // Rows appended while the recompute was in flight sit past the
        // snapshot; keep them, and let the relayout the append queued
        // measure them.
        let mut committed = completion.rows;
        if committed.len() < self.rows.len() {
            let tail = self.rows.split_off(committed.len());
            committed.extend(tail);
        }
        self.rows = committed;

        // Written only after the fan-in, as one sequential step, and only
        // when every row actually reflects the target context (a tail
        // appended mid-flight does not yet).
        let consistent = self.rows.iter().all(|row| row.context() == pending.target);
        if consistent {
            self.cache
                .store(pending.target, self.rows.iter().map(DiffRow::sizes).collect());
        }
        self.commit(pending.target, &pending.update);
        self.pump();
    }

    fn commit(&mut self, target: LayoutContext, update: &LayoutUpdate) {
        self.context = target;
        self.heights.rebuild(self.rows.iter().map(DiffRow::height));
        self.host.on_layout_complete(update);
        for row in &mut self.rows {
            row.clear_layout_dirty();
        }
    }

    fn apply_toggle(&mut self, index: RowIndex) {
        let Some(row) = self.rows.get_mut(index.get()) else {
            debug!(%index, "expansion toggle for out-of-range row ignored");
            return;
        };
        if row.toggle_expansion().is_none() {
            debug!(%index, "expansion toggle for non-collapsible row ignored");
            return;
        }
        let height = row.height();
        self.heights.set(index.get(), height);
        self.host.on_row_expansion_changed(index);
    }

    fn append_rows(&mut self, contents: Vec<RowContent>) {
        if contents.is_empty() {
            return;
        }
        // Stamp and measure against the context the queue will have
        // settled on, not the one committed right now, so an append
        // racing a width or style change converges on the newer values.
        let target = self.effective_context();
        let start = self.rows.len();
        self.rows.extend(
            contents
                .into_iter()
                .map(|content| DiffRow::styled(content, target.font, target.theme)),
        );
        for row in &self.rows[start..] {
            self.heights.push(row.height());
        }
        // Appending is a structural change: every cache entry is stale.
        self.cache.invalidate_all();
        self.host.on_rows_appended(start..self.rows.len());
        self.request_relayout(LayoutUpdate::InitialLoad { width: target.width });
    }

    /// The context the collection will reflect once the pending and
    /// queued updates have all committed.
    fn effective_context(&self) -> LayoutContext {
        let base = self.pending.as_ref().map_or(self.context, |pending| pending.target);
        self.queued.iter().fold(base, |ctx, update| match *update {
            LayoutUpdate::InitialLoad { width } | LayoutUpdate::WidthChanged { width } => {
                ctx.with_width(width)
            }
            LayoutUpdate::StyleChanged { font, theme } => ctx.with_style(font, theme),
            LayoutUpdate::ExpansionToggled { .. } => ctx,
        })
    }

    fn target_context(&self, update: &LayoutUpdate) -> LayoutContext {
        match *update {
            LayoutUpdate::InitialLoad { width } | LayoutUpdate::WidthChanged { width } => {
                self.context.with_width(width)
            }
            LayoutUpdate::StyleChanged { font, theme } => self.context.with_style(font, theme),
            LayoutUpdate::ExpansionToggled { .. } => self.context,
        }
    }
}
