//! Pure row geometry.
//!
//! Measurement is a total function of content and [`LayoutContext`]: no
//! side effects, no failure modes. Heights are counted in wrapped lines
//! at the context's effective width, using display-cell widths rather
//! than char counts so wide glyphs wrap where a terminal would wrap them.

use crate::model::{LayoutContext, RowContent, RowSizes};
use unicode_width::UnicodeWidthStr;

/// Columns reserved for the change gutter (markers and indentation).
const GUTTER_COLS: u16 = 4;

/// Compute the effective wrap width for a context.
///
/// The font context scales the usable width: large type fits fewer cells
/// per line. Never returns 0, so measurement stays total even for
/// degenerate viewports.
fn effective_wrap_width(context: &LayoutContext) -> usize {
    let usable = usize::from(context.width.saturating_sub(GUTTER_COLS));
    let scaled = usable * 100 / usize::from(context.font.wrap_scale_percent());
    scaled.max(1)
}

/// Number of lines `text` occupies when greedily word-wrapped at `max`
/// columns. Empty text still occupies one line.
fn wrapped_height(text: &str, max: usize) -> u16 {
    let mut lines: u16 = 1;
    let mut col = 0usize;
    for word in text.split_whitespace() {
        let width = UnicodeWidthStr::width(word);
        if width > max {
            // A word wider than the line hard-breaks across lines.
            if col > 0 {
                lines = lines.saturating_add(1);
            }
            let mut rest = width;
            while rest > max {
                rest -= max;
                lines = lines.saturating_add(1);
            }
            col = rest;
            continue;
        }
        let needed = if col == 0 { width } else { width + 1 };
        if col + needed > max {
            lines = lines.saturating_add(1);
            col = width;
        } else {
            col += needed;
        }
    }
    lines
}

/// Measure one row's heights against a layout context.
///
/// For collapsible rows both presentations are measured at once, so the
/// expansion toggle never needs to re-enter measurement.
pub fn measure_row(content: &RowContent, context: &LayoutContext) -> RowSizes {
    let max = effective_wrap_width(context);
    match content {
        RowContent::Change(change) => {
            let mut height = wrapped_height(&change.heading, max);
            for line in &change.lines {
                height = height.saturating_add(wrapped_height(&line.text, max));
            }
            if let Some(note) = &change.note {
                height = height.saturating_add(wrapped_height(&note.summary(), max));
            }
            RowSizes { collapsed: height, expanded: None }
        }
        RowContent::Context(context_group) => {
            let collapsed = wrapped_height(&context_group.heading, max);
            let mut expanded = collapsed;
            for line in &context_group.lines {
                expanded = expanded.saturating_add(wrapped_height(line, max));
            }
            RowSizes { collapsed, expanded: Some(expanded) }
        }
        RowContent::Unedited(unedited) => {
            let banner = format!("{} unchanged lines", unedited.line_count);
            RowSizes { collapsed: wrapped_height(&banner, max), expanded: None }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ChangeContent, ChangeKind, ChangeLine, ContextContent, FontContext, RevisionNote,
        ThemeToken, UneditedContent,
    };

    fn ctx(width: u16) -> LayoutContext {
        LayoutContext::new(width, FontContext::Regular, ThemeToken::Light)
    }

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(wrapped_height("hello", 10), 1);
        assert_eq!(wrapped_height("", 10), 1);
    }

    #[test]
    fn words_wrap_greedily() {
        // "aa bb cc dd" at 10 columns: "aa bb cc" fills to 8, "dd" would
        // need 11, so it wraps.
        assert_eq!(wrapped_height("aa bb cc dd", 10), 2);
    }

    #[test]
    fn oversized_word_hard_breaks() {
        assert_eq!(wrapped_height("abcdefghijkl", 10), 2);
        assert_eq!(wrapped_height("abcdefghijklmnopqrstu", 10), 3);
    }

    #[test]
    fn wide_glyphs_count_display_cells() {
        // Six CJK chars occupy twelve cells; at 10 columns that is two
        // lines even though there are fewer than ten chars.
        assert_eq!(wrapped_height("\u{4f60}\u{597d}\u{4f60}\u{597d}\u{4f60}\u{597d}", 10), 2);
    }

    #[test]
    fn change_row_sums_heading_lines_and_note() {
        let content = RowContent::Change(ChangeContent {
            heading: "Line 3".to_string(),
            lines: vec![
                ChangeLine { text: "one".to_string(), change: ChangeKind::Added },
                ChangeLine { text: "two".to_string(), change: ChangeKind::Removed },
            ],
            note: Some(RevisionNote {
                author: "Vumba".to_string(),
                timestamp: "2024-03-09T14:32:00Z".parse().expect("valid timestamp"),
                delta_bytes: 12,
                comment: None,
                minor: false,
            }),
        });
        let sizes = measure_row(&content, &ctx(80));
        assert_eq!(sizes.collapsed, 4, "heading + 2 lines + note summary");
        assert_eq!(sizes.expanded, None);
    }

    #[test]
    fn context_row_measures_both_presentations() {
        let content = RowContent::Context(ContextContent {
            heading: "Intro".to_string(),
            lines: vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()],
        });
        let sizes = measure_row(&content, &ctx(80));
        assert_eq!(sizes.collapsed, 1);
        assert_eq!(sizes.expanded, Some(4));
    }

    #[test]
    fn unedited_row_is_a_banner() {
        let content = RowContent::Unedited(UneditedContent { line_count: 240 });
        let sizes = measure_row(&content, &ctx(80));
        assert_eq!(sizes.collapsed, 1);
        assert_eq!(sizes.expanded, None);
    }

    #[test]
    fn narrower_width_never_shrinks_height() {
        let content = RowContent::Change(ChangeContent {
            heading: "A reasonably long heading that will wrap somewhere".to_string(),
            lines: vec![ChangeLine {
                text: "some changed text that is also fairly long".to_string(),
                change: ChangeKind::Added,
            }],
            note: None,
        });
        let wide = measure_row(&content, &ctx(120)).collapsed;
        let narrow = measure_row(&content, &ctx(40)).collapsed;
        assert!(narrow >= wide);
    }

    #[test]
    fn large_font_wraps_earlier_than_regular() {
        let content = RowContent::Change(ChangeContent {
            heading: "word word word word word word word word word word".to_string(),
            lines: Vec::new(),
            note: None,
        });
        let regular = measure_row(&content, &ctx(60)).collapsed;
        let large = measure_row(
            &content,
            &LayoutContext::new(60, FontContext::Large, ThemeToken::Light),
        )
        .collapsed;
        assert!(large > regular);
    }

    #[test]
    fn degenerate_width_stays_total() {
        let content = RowContent::Unedited(UneditedContent { line_count: 3 });
        // Zero-width viewport still measures; it just wraps hard.
        let sizes = measure_row(&content, &ctx(0));
        assert!(sizes.collapsed >= 1);
    }
}
