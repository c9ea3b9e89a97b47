//! Concurrent layout recomputation engine.
//!
//! A relayout request fans the row collection out as contiguous,
//! row-disjoint chunks over a bounded pool of worker threads, then fans
//! back in through a counting collector that emits exactly one
//! [`LayoutCompletion`] once every chunk has reported. Chunks never share
//! a row and per-row relayout is pure, so chunk completion order cannot
//! affect the committed result.
//!
//! Completions are delivered over a channel the caller drains on its own
//! single-threaded context; the engine never calls back across threads.

use crate::layout::measure;
use crate::model::{DiffRow, FontContext, Generation, RowIndex, ThemeToken};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Default number of rows per concurrent chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// What changed, and therefore which row attribute a relayout targets.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutUpdate {
    /// First measurement of a freshly loaded or appended collection.
    InitialLoad {
        /// Viewport width in columns.
        width: u16,
    },
    /// The viewport width changed (e.g. rotation).
    WidthChanged {
        /// New viewport width in columns.
        width: u16,
    },
    /// The font context or theme changed.
    StyleChanged {
        /// New font context.
        font: FontContext,
        /// New theme token.
        theme: ThemeToken,
    },
    /// A single context row was collapsed or expanded.
    ///
    /// Never dispatched through the concurrent path: the toggle touches
    /// exactly one row and both presentations were measured up front.
    ExpansionToggled {
        /// The toggled row.
        index: RowIndex,
    },
}

impl LayoutUpdate {
    /// Whether this update re-measures the whole collection (as opposed
    /// to the single-row expansion toggle).
    pub fn is_full_pass(&self) -> bool {
        !matches!(self, LayoutUpdate::ExpansionToggled { .. })
    }
}

/// The exactly-once result of one `recompute` call.
#[derive(Debug)]
pub struct LayoutCompletion {
    /// Sequence number returned by the `recompute` call this answers.
    pub seq: u64,
    /// Generation of the row collection the snapshot was taken from.
    pub generation: Generation,
    /// The update that was applied.
    pub update: LayoutUpdate,
    /// The relaid-out rows, in original collection order.
    pub rows: Vec<DiffRow>,
}

/// Pure per-row relayout.
///
/// Applies the update's effect only when the targeted attribute actually
/// differs, so a no-op update returns the row untouched and undirtied,
/// and redundant invalidation never propagates downstream.
pub fn relayout_row(mut row: DiffRow, update: &LayoutUpdate) -> DiffRow {
    let target = match *update {
        LayoutUpdate::InitialLoad { width } | LayoutUpdate::WidthChanged { width } => {
            if row.width() == width {
                return row;
            }
            row.context().with_width(width)
        }
        LayoutUpdate::StyleChanged { font, theme } => {
            if row.font() == font && row.theme() == theme {
                return row;
            }
            row.context().with_style(font, theme)
        }
        // Expansion flips are the state machine's job; nothing to measure.
        LayoutUpdate::ExpansionToggled { .. } => return row,
    };
    let sizes = measure::measure_row(row.content(), &target);
    row.install_layout(target, sizes);
    row
}

struct ChunkJob {
    chunk: usize,
    rows: Vec<DiffRow>,
    update: LayoutUpdate,
    reply: Sender<ChunkDone>,
}

struct ChunkDone {
    chunk: usize,
    rows: Vec<DiffRow>,
}

/// Bounded worker pool with a per-request counting join barrier.
pub struct LayoutEngine {
    job_tx: Option<Sender<ChunkJob>>,
    workers: Vec<JoinHandle<()>>,
    collectors: Vec<JoinHandle<()>>,
    done_tx: Sender<LayoutCompletion>,
    done_rx: Receiver<LayoutCompletion>,
    next_seq: u64,
}

impl LayoutEngine {
    /// Spawn a pool of `worker_threads` chunk workers; 0 means one per
    /// available core.
    pub fn new(worker_threads: usize) -> Self {
        let pool_size = if worker_threads == 0 {
            thread::available_parallelism().map_or(4, usize::from)
        } else {
            worker_threads
        };

        let (job_tx, job_rx) = unbounded::<ChunkJob>();
        let (done_tx, done_rx) = unbounded();

        let workers = (0..pool_size)
            .map(|_| {
                let jobs = job_rx.clone();
                thread::spawn(move || {
                    while let Ok(job) = jobs.recv() {
                        let rows = job
                            .rows
                            .into_iter()
                            .map(|row| relayout_row(row, &job.update))
                            .collect();
                        // The collector may already be gone during teardown.
                        let _ = job.reply.send(ChunkDone { chunk: job.chunk, rows });
                    }
                })
            })
            .collect();

        Self {
            job_tx: Some(job_tx),
            workers,
            collectors: Vec::new(),
            done_tx,
            done_rx,
            next_seq: 0,
        }
    }

    /// Number of chunk workers in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Receiver for completion signals.
    ///
    /// Drain it from the single-threaded context that owns presentation;
    /// each `recompute` call produces exactly one completion here.
    pub fn completions(&self) -> &Receiver<LayoutCompletion> {
        &self.done_rx
    }

    /// Re-measure a snapshot of the row collection against `update`.
    ///
    /// Returns the request's sequence number; the matching
    /// [`LayoutCompletion`] arrives on [`completions`] strictly after
    /// every chunk has finished. An empty snapshot or a zero chunk size
    /// is engine misuse and completes immediately with the rows
    /// untouched, as does the single-row `ExpansionToggled` update.
    ///
    /// [`completions`]: LayoutEngine::completions
    pub fn recompute(
        &mut self,
        rows: Vec<DiffRow>,
        update: LayoutUpdate,
        chunk_size: usize,
        generation: Generation,
    ) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.collectors.retain(|handle| !handle.is_finished());

        if rows.is_empty() || chunk_size == 0 || !update.is_full_pass() {
            if update.is_full_pass() {
                debug!(seq, rows = rows.len(), chunk_size, "relayout request with nothing to fan out");
            }
            let _ = self.done_tx.send(LayoutCompletion { seq, generation, update, rows });
            return seq;
        }

        let chunks = split_into_chunks(rows, chunk_size);
        let total = chunks.len();
        let (reply_tx, reply_rx) = unbounded::<ChunkDone>();

        if let Some(job_tx) = &self.job_tx {
            for (chunk, chunk_rows) in chunks.into_iter().enumerate() {
                let job = ChunkJob {
                    chunk,
                    rows: chunk_rows,
                    update: update.clone(),
                    reply: reply_tx.clone(),
                };
                if job_tx.send(job).is_err() {
                    break;
                }
            }
        }
        drop(reply_tx);

        let done_tx = self.done_tx.clone();
        let collector = thread::spawn(move || {
            let mut slots: Vec<Option<Vec<DiffRow>>> =
                std::iter::repeat_with(|| None).take(total).collect();
            let mut remaining = total;
            while remaining > 0 {
                match reply_rx.recv() {
                    Ok(done) => {
                        if let Some(slot) = slots.get_mut(done.chunk) {
                            *slot = Some(done.rows);
                            remaining -= 1;
                        }
                    }
                    // Workers disconnected mid-flight: engine teardown.
                    Err(_) => return,
                }
            }
            let rows: Vec<DiffRow> = slots.into_iter().flatten().flatten().collect();
            let _ = done_tx.send(LayoutCompletion { seq, generation, update, rows });
        });
        self.collectors.push(collector);
        seq
    }
}

impl Drop for LayoutEngine {
    fn drop(&mut self) {
        // Disconnect the job channel so workers drain and exit, then join
        // everything; outstanding completions are simply never read.
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        for handle in self.collectors.drain(..) {
            let _ = handle.join();
        }
    }
}

/// Partition rows into contiguous chunks of `chunk_size`; the last chunk
/// may be shorter.
fn split_into_chunks(rows: Vec<DiffRow>, chunk_size: usize) -> Vec<Vec<DiffRow>> {
    let mut chunks = Vec::with_capacity(rows.len().div_ceil(chunk_size));
    let mut rows = rows.into_iter();
    loop {
        let chunk: Vec<DiffRow> = rows.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }
    chunks
}
