//! Fetch error taxonomy for the remote page boundary.
//!
//! Fetch failures are non-fatal by contract: the controller clears its
//! in-flight flag, leaves the cursor and the row collection untouched,
//! and surfaces the error to the presentation host. The next proximity
//! trigger retries the same cursor, so every variant here must be safe
//! to retry.

use thiserror::Error;

/// Errors produced by a [`crate::paging::PageSource`] fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// I/O failure reading the page backing store.
    ///
    /// Covers file-backed sources (the fixture source) and any transport
    /// a real source wraps. The cursor is untouched, so retrying after
    /// the condition clears resumes at the same page.
    #[error("IO error fetching page: {0}")]
    Io(#[from] std::io::Error),

    /// The page payload could not be decoded.
    ///
    /// `line` is 1-based within the source's backing document; 0 when the
    /// failure is not tied to a specific line (e.g. a corrupt
    /// continuation token).
    #[error("failed to decode page data at line {line}: {message}")]
    Decode {
        /// 1-based line in the backing document, 0 if not line-addressed.
        line: usize,
        /// Decoder error detail.
        message: String,
    },

    /// The remote source refused or failed the request.
    #[error("page source unavailable: {reason}")]
    Unavailable {
        /// Human-readable failure detail from the source.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_error_converts_via_from() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: FetchError = io_err.into();
        let msg = err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn decode_error_reports_line() {
        let err = FetchError::Decode {
            line: 17,
            message: "unexpected token".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 17"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn unavailable_reports_reason() {
        let err = FetchError::Unavailable {
            reason: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("rate limited"));
    }
}
