//! Opaque pagination cursor.

/// Continuation token identifying the next page to fetch.
///
/// Created empty at controller construction and replaced wholesale with
/// the token each successful fetch returns. The token's contents are
/// meaningful only to the page source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageCursor {
    token: Option<String>,
}

impl PageCursor {
    /// The cursor addressing the first page.
    pub fn start() -> Self {
        Self::default()
    }

    /// A cursor resuming from a source-issued continuation token.
    pub fn resume(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()) }
    }

    /// The raw continuation token, `None` for the first page.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether this cursor addresses the first page.
    pub fn is_start(&self) -> bool {
        self.token.is_none()
    }
}
