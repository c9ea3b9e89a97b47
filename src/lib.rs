//! revdiff
//!
//! Concurrent relayout and incremental paging core for revision diff
//! lists.
//!
//! The crate owns two tightly coupled responsibilities of a revision-diff
//! screen: re-measuring a long heterogeneous row collection in parallel,
//! row-disjoint chunks whenever the viewport width, font scale, theme, or
//! a row's expansion state changes, and growing that collection from a
//! cursor-based page source without duplicate or out-of-order fetches.
//! Rendering and transport stay behind the [`coordinator::PresentationHost`]
//! and [`paging::PageSource`] traits.

pub mod config;
pub mod coordinator;
pub mod layout;
pub mod logging;
pub mod model;
pub mod paging;
