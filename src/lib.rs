//! Profiler Flames
//!
//! Drives a single async-profiler session against a running process,
//! sanitizes the collapsed stacks it produces, and renders flame and
//! icicle graphs from them.
//!
//! This crate provides the core implementation for the
//! `profiler-flames` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! cargo install profiler-flames
//! profiler-flames record --pid 4242 --profiler-home /opt/async-profiler --duration 30
//! ```

pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod session;
pub mod stacks;
pub mod utils;
