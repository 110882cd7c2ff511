//! Collapsed stack parsing and sanitization.
//!
//! This module turns raw async-profiler collapsed output into:
//! - Parsed stacks (frames plus sample weight)
//! - Sanitized stack files ready for flamegraph rendering

pub mod collapsed;
pub mod sanitizer;

// Re-export main types and functions
pub use collapsed::Stack;
pub use sanitizer::{SanitizeRule, SanitizeStats, Sanitizer};
