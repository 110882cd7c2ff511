//! Flamegraph generation.
//!
//! This module renders sanitized collapsed stacks into flame and icicle
//! SVG graphs, either with an external flamegraph script or with inferno.

pub mod generator;
pub mod tool;

// Re-export main types
pub use generator::{generate_graphs, ColorScheme, GraphOptions, GraphOutcome, GraphSet};
pub use tool::{FlamegraphScript, InfernoRenderer, RenderTool};
