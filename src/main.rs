//! revdiff - fixture replay entry point.
//!
//! Drives the coordinator headlessly: pages the whole fixture in,
//! toggles the first collapsible row, rotates the viewport width, and
//! reports what the presentation layer observed.

use clap::Parser;
use revdiff::coordinator::{CoordinatorOptions, ListCoordinator, PresentationHost};
use revdiff::layout::LayoutUpdate;
use revdiff::model::{FetchError, LayoutContext, RowIndex};
use revdiff::paging::FixturePageSource;
use std::ops::Range;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Replay a revision diff fixture through the concurrent relayout core.
#[derive(Parser, Debug)]
#[command(name = "revdiff")]
#[command(version)]
#[command(about = "Replay a revision diff fixture through the concurrent relayout core")]
pub struct Args {
    /// Path to a JSONL fixture with one diff row per line
    pub fixture: PathBuf,

    /// Viewport width in columns
    #[arg(short, long, default_value_t = 80)]
    pub width: u16,

    /// Viewport height in lines
    #[arg(long, default_value_t = 40)]
    pub height: usize,

    /// Rows per fetched page
    #[arg(short, long, default_value_t = 25)]
    pub page_size: usize,

    /// Color theme
    #[arg(long, value_parser = ["light", "dark", "sepia", "black"])]
    pub theme: Option<String>,

    /// Font context
    #[arg(long, value_parser = ["compact", "regular", "large"])]
    pub font: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Host that narrates callbacks through tracing and keeps counters for
/// the final summary.
#[derive(Debug, Default)]
struct ReplayHost {
    layout_passes: usize,
    rows_appended: usize,
    expansion_toggles: usize,
    fetch_failures: usize,
}

impl PresentationHost for ReplayHost {
    fn on_layout_complete(&mut self, update: &LayoutUpdate) {
        self.layout_passes += 1;
        info!(?update, "layout committed");
    }

    fn on_rows_appended(&mut self, range: Range<usize>) {
        self.rows_appended += range.len();
        info!(?range, "rows appended");
    }

    fn on_row_expansion_changed(&mut self, index: RowIndex) {
        self.expansion_toggles += 1;
        info!(%index, "row expansion changed");
    }

    fn on_fetch_failed(&mut self, error: &FetchError) {
        self.fetch_failures += 1;
        info!(%error, "page fetch failed");
    }
}

fn drive_until_idle(
    coordinator: &mut ListCoordinator<ReplayHost>,
    viewport_height: usize,
    follow_tail: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = Instant::now() + Duration::from_secs(30);
    loop {
        if follow_tail {
            // Pin the viewport to the end so proximity keeps fetching.
            let offset = coordinator.total_height().saturating_sub(viewport_height);
            coordinator.on_scroll(offset, viewport_height);
        }
        let progressed = coordinator.poll();
        let fetching = follow_tail && !coordinator.is_exhausted();
        if !fetching && coordinator.is_idle() {
            return Ok(());
        }
        if Instant::now() > deadline {
            return Err("fixture replay stalled".into());
        }
        if !progressed {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = {
        let config_file = revdiff::config::load_config_with_precedence(args.config.clone())?;
        let merged = revdiff::config::merge_config(config_file);
        let with_env = revdiff::config::apply_env_overrides(merged);

        let theme_override = args.theme.as_deref().map(str::parse).transpose()?;
        let font_override = args.font.as_deref().map(str::parse).transpose()?;
        revdiff::config::apply_cli_overrides(with_env, theme_override, font_override, None)
    };

    revdiff::logging::init(&config.log_file_path)?;
    info!(config = ?config, "configuration resolved");

    let source = FixturePageSource::from_path(&args.fixture, args.page_size)?;
    info!(rows = source.len(), "fixture loaded");

    let context = LayoutContext::new(args.width, config.font, config.theme);
    let options = CoordinatorOptions {
        chunk_size: config.chunk_size,
        worker_threads: config.worker_threads,
        prefetch_threshold: config.prefetch_threshold,
    };
    let mut coordinator =
        ListCoordinator::new(ReplayHost::default(), source, context, options);

    // Page the whole history in.
    drive_until_idle(&mut coordinator, args.height, true)?;

    // Toggle the first collapsible row, if any.
    let collapsible = coordinator
        .rows()
        .iter()
        .position(|row| row.content().is_collapsible());
    if let Some(index) = collapsible {
        coordinator.toggle_expansion(RowIndex::new(index));
        drive_until_idle(&mut coordinator, args.height, false)?;
    }

    // Rotate the viewport and settle again.
    let rotated = args.width.saturating_add(40);
    coordinator.request_relayout(LayoutUpdate::WidthChanged { width: rotated });
    drive_until_idle(&mut coordinator, args.height, false)?;

    let host = coordinator.host();
    println!(
        "replayed {} rows ({} lines at width {}, {}/{}): {} layout passes, {} appended, {} toggles, {} fetch failures",
        coordinator.len(),
        coordinator.total_height(),
        coordinator.context().width,
        coordinator.context().font,
        coordinator.context().theme,
        host.layout_passes,
        host.rows_appended,
        host.expansion_toggles,
        host.fetch_failures,
    );

    Ok(())
}
