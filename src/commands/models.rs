use crate::flamegraph::{FlamegraphScript, InfernoRenderer, RenderTool};
use crate::session::{InvocationMode, ProfilerConfig};
use crate::utils::config::DEFAULT_FLAMEGRAPH_SCRIPT;
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// Which backend renders the graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RendererKind {
    /// External flamegraph.pl-compatible script
    #[default]
    Script,
    /// Built-in inferno renderer
    Inferno,
}

impl RendererKind {
    /// Build the renderer for this kind
    pub fn build(self, script: &Path) -> Box<dyn RenderTool> {
        match self {
            Self::Script => Box::new(FlamegraphScript::new(script)),
            Self::Inferno => Box::new(InfernoRenderer),
        }
    }
}

/// Arguments for the record command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct RecordArgs {
    /// Process id of the profiled process
    pub pid: String,

    /// Daemon (separate process) or embedded agent
    pub mode: InvocationMode,

    /// Directory receiving all session artifacts
    pub output_dir: PathBuf,

    /// Base name of the artifacts
    pub profile_name: String,

    /// Seconds to record; 0 waits for Enter on stdin
    pub duration_secs: u64,

    pub config: ProfilerConfig,

    pub renderer: RendererKind,

    /// flamegraph.pl location, used by `RendererKind::Script`
    pub flamegraph_script: PathBuf,
}

impl Default for RecordArgs {
    fn default() -> Self {
        Self {
            pid: String::new(),
            mode: InvocationMode::Daemon,
            output_dir: PathBuf::from("profile-out"),
            profile_name: "profile".to_string(),
            duration_secs: 0,
            config: ProfilerConfig::default(),
            renderer: RendererKind::default(),
            flamegraph_script: PathBuf::from(DEFAULT_FLAMEGRAPH_SCRIPT),
        }
    }
}
