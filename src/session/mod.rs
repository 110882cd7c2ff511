//! Profiling session lifecycle.
//!
//! This module owns everything tied to one async-profiler recording:
//! - Profiler configuration and target process identity
//! - External command execution for the agent control script
//! - The start/stop controller and its post-processing
//! - The JSON session report

pub mod config;
pub mod controller;
pub mod exec;
pub mod report;
pub mod target;

// Re-export main types
pub use config::{Counter, ProfilerConfig};
pub use controller::{ProfilerController, SessionOutcome, SessionState};
pub use exec::{CommandExec, Invocation, SystemExec};
pub use report::{GraphReport, SessionReport};
pub use target::{InvocationMode, ScenarioOutput, SessionTarget};
