//! Session report JSON schema.
//!
//! Written next to the graphs so a later reader can tell what was captured,
//! how many stacks survived sanitizing, and which graphs were produced.

use super::config::{Counter, ProfilerConfig};
use super::controller::SessionOutcome;
use super::target::{InvocationMode, SessionTarget};
use crate::flamegraph::GraphOutcome;
use crate::stacks::SanitizeStats;
use crate::utils::config::{PROFILER_NAME, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Schema version for compatibility checking
    pub version: String,

    pub profiler: String,
    pub pid: String,
    pub mode: InvocationMode,
    pub event: String,
    pub counter: Counter,

    pub raw_stacks: PathBuf,
    pub sanitized_stacks: PathBuf,
    pub stacks: SanitizeStats,

    pub flame_graph: GraphReport,
    pub icicle_graph: GraphReport,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// Serializable form of a `GraphOutcome`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GraphReport {
    Rendered { path: PathBuf },
    Skipped,
    Failed { error: String },
}

impl From<&GraphOutcome> for GraphReport {
    fn from(outcome: &GraphOutcome) -> Self {
        match outcome {
            GraphOutcome::Rendered(path) => Self::Rendered { path: path.clone() },
            GraphOutcome::Skipped => Self::Skipped,
            GraphOutcome::Failed(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}

impl SessionReport {
    pub fn new(config: &ProfilerConfig, target: &SessionTarget, outcome: &SessionOutcome) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            profiler: PROFILER_NAME.to_string(),
            pid: target.pid.clone(),
            mode: target.mode,
            event: config.event.clone(),
            counter: config.counter,
            raw_stacks: outcome.raw_stacks.clone(),
            sanitized_stacks: outcome.sanitized_stacks.clone(),
            stacks: outcome.stats,
            flame_graph: GraphReport::from(&outcome.graphs.flame),
            icicle_graph: GraphReport::from(&outcome.graphs.icicle),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
