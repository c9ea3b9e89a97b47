//! Property tests for the layout recomputation engine.
//!
//! The engine's contract is algebraic: a width update reaches every row,
//! chunking must not be observable in the committed result, and per-row
//! relayout is idempotent. Each property is exercised over arbitrary
//! heterogeneous row collections.

use proptest::prelude::*;
use revdiff::layout::{relayout_row, LayoutEngine, LayoutUpdate};
use revdiff::model::{
    ChangeContent, ChangeKind, ChangeLine, ContextContent, DiffRow, FontContext, Generation,
    RowContent, ThemeToken, UneditedContent,
};
use std::time::Duration;

fn wait_rows(engine: &LayoutEngine) -> Vec<DiffRow> {
    engine
        .completions()
        .recv_timeout(Duration::from_secs(10))
        .expect("completion within timeout")
        .rows
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-z]{1,12}( [a-z]{1,12}){0,8}"
}

fn arb_change_kind() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Added),
        Just(ChangeKind::Removed),
        Just(ChangeKind::Moved),
    ]
}

fn arb_row_content() -> impl Strategy<Value = RowContent> {
    prop_oneof![
        (arb_text(), prop::collection::vec((arb_text(), arb_change_kind()), 0..4)).prop_map(
            |(heading, lines)| {
                RowContent::Change(ChangeContent {
                    heading,
                    lines: lines
                        .into_iter()
                        .map(|(text, change)| ChangeLine { text, change })
                        .collect(),
                    note: None,
                })
            }
        ),
        (arb_text(), prop::collection::vec(arb_text(), 0..6))
            .prop_map(|(heading, lines)| RowContent::Context(ContextContent { heading, lines })),
        (1usize..500)
            .prop_map(|line_count| RowContent::Unedited(UneditedContent { line_count })),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn width_update_reaches_every_row(
        contents in prop::collection::vec(arb_row_content(), 1..60),
        width in 20u16..200,
        chunk_size in 1usize..20,
    ) {
        let mut engine = LayoutEngine::new(4);
        let rows: Vec<DiffRow> = contents.into_iter().map(DiffRow::new).collect();
        engine.recompute(
            rows,
            LayoutUpdate::WidthChanged { width },
            chunk_size,
            Generation::first(),
        );

        let rows = wait_rows(&engine);
        for row in &rows {
            prop_assert_eq!(row.width(), width);
            prop_assert!(row.height() > 0);
            prop_assert!(row.is_layout_dirty());
        }
    }

    #[test]
    fn chunking_is_not_observable(
        contents in prop::collection::vec(arb_row_content(), 1..60),
        width in 20u16..200,
        chunk_size in 1usize..25,
    ) {
        let rows: Vec<DiffRow> = contents.into_iter().map(DiffRow::new).collect();
        let update = LayoutUpdate::WidthChanged { width };

        // Reference: the whole collection as one chunk (sequential).
        let mut reference_engine = LayoutEngine::new(1);
        reference_engine.recompute(
            rows.clone(),
            update.clone(),
            rows.len(),
            Generation::first(),
        );
        let reference = wait_rows(&reference_engine);

        // Subject: concurrent chunks completing in arbitrary order.
        let mut chunked_engine = LayoutEngine::new(8);
        chunked_engine.recompute(rows, update, chunk_size, Generation::first());
        let chunked = wait_rows(&chunked_engine);

        prop_assert_eq!(chunked, reference);
    }

    #[test]
    fn per_row_relayout_is_idempotent(
        content in arb_row_content(),
        width in 20u16..200,
    ) {
        let update = LayoutUpdate::WidthChanged { width };
        let once = relayout_row(DiffRow::new(content), &update);
        let twice = relayout_row(once.clone(), &update);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn context_rows_measure_both_presentations(
        contents in prop::collection::vec(arb_row_content(), 1..40),
        width in 20u16..200,
    ) {
        let mut engine = LayoutEngine::new(4);
        let rows: Vec<DiffRow> = contents.into_iter().map(DiffRow::new).collect();
        engine.recompute(
            rows,
            LayoutUpdate::InitialLoad { width },
            10,
            Generation::first(),
        );

        for row in &wait_rows(&engine) {
            let sizes = row.sizes();
            match row.content() {
                RowContent::Context(_) => {
                    let expanded = sizes.expanded.expect("context rows measure expanded height");
                    prop_assert!(expanded >= sizes.collapsed);
                }
                _ => prop_assert_eq!(sizes.expanded, None),
            }
        }
    }

    #[test]
    fn theme_change_restamps_without_moving_geometry(
        contents in prop::collection::vec(arb_row_content(), 1..40),
        width in 20u16..200,
    ) {
        let mut engine = LayoutEngine::new(4);
        let rows: Vec<DiffRow> = contents.into_iter().map(DiffRow::new).collect();
        engine.recompute(
            rows,
            LayoutUpdate::InitialLoad { width },
            10,
            Generation::first(),
        );
        let measured = wait_rows(&engine);
        let heights: Vec<u16> = measured.iter().map(DiffRow::height).collect();

        engine.recompute(
            measured,
            LayoutUpdate::StyleChanged {
                font: FontContext::Regular,
                theme: ThemeToken::Black,
            },
            10,
            Generation::first(),
        );
        let restamped = wait_rows(&engine);

        for (row, height) in restamped.iter().zip(heights) {
            prop_assert_eq!(row.theme(), ThemeToken::Black);
            prop_assert_eq!(row.height(), height);
        }
    }
}
