//! Profiled process identity and per-session artifact paths.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the profiled process relates to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    /// Separate long-lived OS process; the agent is driven by pid
    Daemon,
    /// Agent attached at launch of the target itself; no control commands
    Embedded,
}

/// The process under profiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    pub pid: String,
    pub mode: InvocationMode,
}

impl SessionTarget {
    pub fn new(pid: impl Into<String>, mode: InvocationMode) -> Self {
        Self {
            pid: pid.into(),
            mode,
        }
    }

    /// Whether start/stop must be sent to the agent control script
    pub fn is_separate_process(&self) -> bool {
        self.mode == InvocationMode::Daemon
    }
}

/// Artifact locations for one profiling session
///
/// Every path is derived from the output directory and profile name, so two
/// sessions sharing an output directory would overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutput {
    pub output_dir: PathBuf,
    pub profile_name: String,
}

impl ScenarioOutput {
    pub fn new(output_dir: impl Into<PathBuf>, profile_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            profile_name: profile_name.into(),
        }
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.profile_name, suffix))
    }

    /// Raw collapsed stacks flushed by the agent
    pub fn raw_stacks(&self) -> PathBuf {
        self.file(".stacks.txt")
    }

    pub fn sanitized_stacks(&self) -> PathBuf {
        self.file(".simplified-stacks.txt")
    }

    pub fn flame_graph(&self) -> PathBuf {
        self.file("-flames.svg")
    }

    pub fn icicle_graph(&self) -> PathBuf {
        self.file("-icicles.svg")
    }

    pub fn report(&self) -> PathBuf {
        self.file(".session.json")
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
