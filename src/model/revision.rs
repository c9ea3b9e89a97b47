//! Revision metadata attached to change rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of the revision a change row came from.
///
/// Carried as immutable content on change rows; the one-line [`summary`]
/// participates in row measurement.
///
/// [`summary`]: RevisionNote::summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionNote {
    /// Editor who made the revision.
    pub author: String,
    /// When the revision was saved (UTC).
    pub timestamp: DateTime<Utc>,
    /// Signed size difference in bytes against the parent revision.
    pub delta_bytes: i64,
    /// Edit summary, if the editor left one.
    #[serde(default)]
    pub comment: Option<String>,
    /// Whether the revision was flagged as a minor edit.
    #[serde(default)]
    pub minor: bool,
}

impl RevisionNote {
    /// One-line rendering of the note: author, signed byte delta, time,
    /// and the comment when present.
    pub fn summary(&self) -> String {
        let delta = if self.delta_bytes >= 0 {
            format!("+{}", self.delta_bytes)
        } else {
            self.delta_bytes.to_string()
        };
        let minor = if self.minor { " m" } else { "" };
        let mut line = format!(
            "{} {} {}{}",
            self.author,
            delta,
            self.timestamp.format("%H:%M"),
            minor
        );
        if let Some(comment) = &self.comment {
            line.push_str(": ");
            line.push_str(comment);
        }
        line
    }
}
