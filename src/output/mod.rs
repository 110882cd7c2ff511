//! Output writers for session reports and graph files.
//!
//! This module handles writing data to disk:
//! - JSON session reports
//! - SVG graph destinations

pub mod json;
pub mod svg;

// Re-export main functions
pub use json::{read_report, write_report};
pub use svg::{create_svg_file, discard_partial, ensure_parent_dir};
