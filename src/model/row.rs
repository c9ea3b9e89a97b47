//! Row model: immutable content plus mutable layout attributes.
//!
//! A diff renders as an ordered sequence of heterogeneous rows. Content
//! never changes after construction and is shared behind an `Arc`, which
//! makes snapshotting the whole collection for a background relayout a
//! pointer-copy per row. Layout attributes (width, style tokens, measured
//! heights) are the only mutable state, and they mutate exclusively
//! through the layout engine or the expansion toggle, never both at
//! once.

use crate::model::context::{FontContext, LayoutContext, ThemeToken};
use crate::model::revision::RevisionNote;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a single change line did to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Line added in this revision.
    Added,
    /// Line removed in this revision.
    Removed,
    /// Line moved from elsewhere in the document.
    Moved,
}

/// One line inside a change row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLine {
    /// The line text.
    pub text: String,
    /// How the revision affected this line.
    pub change: ChangeKind,
}

/// Content of an atomic diff block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeContent {
    /// Block heading, e.g. the line range it covers.
    pub heading: String,
    /// The changed lines in document order.
    pub lines: Vec<ChangeLine>,
    /// Revision metadata, when the block is attributed.
    #[serde(default)]
    pub note: Option<RevisionNote>,
}

/// Content of a collapsible context group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextContent {
    /// Group heading shown in both presentations.
    pub heading: String,
    /// The surrounding unchanged lines revealed when expanded.
    pub lines: Vec<String>,
}

/// Content of an unchanged-span placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UneditedContent {
    /// How many unchanged lines the placeholder stands in for.
    pub line_count: usize,
}

/// Immutable content of one list row, discriminated by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowContent {
    /// Atomic diff block.
    Change(ChangeContent),
    /// Collapsible context group.
    Context(ContextContent),
    /// Placeholder for an unchanged span.
    Unedited(UneditedContent),
}

impl RowContent {
    /// Whether this row kind supports collapsed/expanded presentation.
    pub fn is_collapsible(&self) -> bool {
        matches!(self, RowContent::Context(_))
    }
}

/// Collapsed/expanded presentation of a context row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionState {
    /// Only the heading is presented.
    #[default]
    Collapsed,
    /// Heading plus the full context body.
    Expanded,
}

impl ExpansionState {
    /// The opposite state.
    pub fn toggled(self) -> Self {
        match self {
            ExpansionState::Collapsed => ExpansionState::Expanded,
            ExpansionState::Expanded => ExpansionState::Collapsed,
        }
    }

    /// Whether this is the expanded state.
    pub fn is_expanded(self) -> bool {
        matches!(self, ExpansionState::Expanded)
    }
}

/// Measured heights of one row, in lines.
///
/// `expanded` is populated only for collapsible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowSizes {
    /// Height in the collapsed (or only) presentation.
    pub collapsed: u16,
    /// Height in the expanded presentation, for collapsible rows.
    pub expanded: Option<u16>,
}

/// Mutable layout attributes of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RowLayout {
    width: u16,
    font: FontContext,
    theme: ThemeToken,
    sizes: RowSizes,
    dirty: bool,
}

/// One entry of the row collection: shared immutable content plus the
/// layout attributes the engine maintains for it.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    content: Arc<RowContent>,
    layout: RowLayout,
    expansion: ExpansionState,
}

impl DiffRow {
    /// Wrap content into an unmeasured row (width 0, heights 0).
    ///
    /// The first relayout that reaches the row measures it, because its
    /// width attribute can never equal a real viewport width.
    pub fn new(content: RowContent) -> Self {
        Self {
            content: Arc::new(content),
            layout: RowLayout::default(),
            expansion: ExpansionState::Collapsed,
        }
    }

    /// Unmeasured row pre-stamped with the collection's style tokens, so
    /// the initial width pass measures it against the right font and
    /// theme.
    pub(crate) fn styled(content: RowContent, font: FontContext, theme: ThemeToken) -> Self {
        let mut row = Self::new(content);
        row.layout.font = font;
        row.layout.theme = theme;
        row
    }

    /// The row's immutable content.
    pub fn content(&self) -> &RowContent {
        &self.content
    }

    /// Width the row was last measured against.
    pub fn width(&self) -> u16 {
        self.layout.width
    }

    /// Font context the row was last measured against.
    pub fn font(&self) -> FontContext {
        self.layout.font
    }

    /// Theme the row was last stamped with.
    pub fn theme(&self) -> ThemeToken {
        self.layout.theme
    }

    /// The layout context the row currently reflects.
    pub fn context(&self) -> LayoutContext {
        LayoutContext::new(self.layout.width, self.layout.font, self.layout.theme)
    }

    /// Measured heights of the row.
    pub fn sizes(&self) -> RowSizes {
        self.layout.sizes
    }

    /// Presentation height in lines: the expanded height when a
    /// collapsible row is expanded, the collapsed height otherwise.
    pub fn height(&self) -> u16 {
        match (self.expansion, self.layout.sizes.expanded) {
            (ExpansionState::Expanded, Some(expanded)) => expanded,
            _ => self.layout.sizes.collapsed,
        }
    }

    /// Whether a collapsible row is currently expanded. Always false for
    /// non-collapsible rows.
    pub fn is_expanded(&self) -> bool {
        self.content.is_collapsible() && self.expansion.is_expanded()
    }

    /// Whether the last relayout changed this row's attributes.
    ///
    /// Cleared by the coordinator once the change has been forwarded to
    /// the presentation host.
    pub fn is_layout_dirty(&self) -> bool {
        self.layout.dirty
    }

    /// Install measured layout attributes, marking the row dirty only if
    /// anything actually changed.
    pub(crate) fn install_layout(&mut self, context: LayoutContext, sizes: RowSizes) {
        let next = RowLayout {
            width: context.width,
            font: context.font,
            theme: context.theme,
            sizes,
            dirty: self.layout.dirty,
        };
        if next != self.layout {
            self.layout = next;
            self.layout.dirty = true;
        }
    }

    /// Flip a collapsible row's presentation. Returns the new state, or
    /// `None` (leaving the row untouched) for non-collapsible rows.
    pub(crate) fn toggle_expansion(&mut self) -> Option<ExpansionState> {
        if !self.content.is_collapsible() {
            return None;
        }
        self.expansion = self.expansion.toggled();
        Some(self.expansion)
    }

    /// Clear the dirty marker after the host has consumed the change.
    pub(crate) fn clear_layout_dirty(&mut self) {
        self.layout.dirty = false;
    }
}
