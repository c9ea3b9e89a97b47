//! Domain model: row content and layout attributes, layout context
//! tokens, revision metadata, and the fetch error taxonomy.

pub mod context;
pub mod error;
pub mod revision;
pub mod row;
pub mod types;

pub use context::{FontContext, LayoutContext, ThemeToken};
pub use error::FetchError;
pub use revision::RevisionNote;
pub use row::{
    ChangeContent, ChangeKind, ChangeLine, ContextContent, DiffRow, ExpansionState, RowContent,
    RowSizes, UneditedContent,
};
pub use types::{Generation, RowIndex};
