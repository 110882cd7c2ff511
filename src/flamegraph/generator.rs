//! Flame and icicle graph generation.
//!
//! Renders a sanitized stack file twice through a `RenderTool`: once as a
//! regular flame graph and once as an inverted, reversed icicle graph. The
//! two renders are independent, so a failure in one never suppresses the
//! other.

use super::tool::RenderTool;
use crate::session::config::Counter;
use crate::utils::error::RenderError;
use log::{error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// Color palettes understood by both renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    /// Semantic palette distinguishing JVM, inlined, native and kernel frames
    Java,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
        }
    }
}

/// Options for a single render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    pub title: String,
    pub count_name: String,
    /// Frames narrower than this many pixels are omitted
    pub min_width: u32,
    pub colors: ColorScheme,
    /// Reverse stack order and draw top-down
    pub inverted: bool,
}

impl GraphOptions {
    /// Regular flame graph, roots at the bottom
    pub fn flame(title_prefix: &str, counter: Counter) -> Self {
        Self {
            title: format!("{title_prefix} Flame Graph"),
            count_name: counter.unit_label().to_string(),
            min_width: 1,
            colors: ColorScheme::Java,
            inverted: false,
        }
    }

    /// Icicle graph; the wider width floor keeps the inverted view readable
    pub fn icicle(title_prefix: &str, counter: Counter) -> Self {
        Self {
            title: format!("{title_prefix} Icicle Graph"),
            count_name: counter.unit_label().to_string(),
            min_width: 2,
            colors: ColorScheme::Java,
            inverted: true,
        }
    }
}

/// What happened to one requested graph
#[derive(Debug)]
pub enum GraphOutcome {
    Rendered(PathBuf),
    /// The render tool is not installed
    Skipped,
    Failed(RenderError),
}

impl GraphOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Rendered(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for GraphOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendered(path) => write!(f, "rendered {}", path.display()),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Outcomes of the flame and icicle renders
#[derive(Debug)]
pub struct GraphSet {
    pub flame: GraphOutcome,
    pub icicle: GraphOutcome,
}

impl GraphSet {
    fn skipped() -> Self {
        Self {
            flame: GraphOutcome::Skipped,
            icicle: GraphOutcome::Skipped,
        }
    }

    /// Render errors, flame first
    pub fn errors(&self) -> Vec<&RenderError> {
        [&self.flame, &self.icicle]
            .into_iter()
            .filter_map(|outcome| match outcome {
                GraphOutcome::Failed(e) => Some(e),
                _ => None,
            })
            .collect()
    }
}

/// Render the flame and icicle graphs for one sanitized stack file
///
/// **Public** - graph generation step of a session
///
/// # Arguments
/// * `tool` - Renderer to drive
/// * `stacks` - Sanitized collapsed-stack file
/// * `flame_path` / `icicle_path` - Destinations
/// * `title_prefix` - Uppercased event name
/// * `counter` - Picks the count label
///
/// # Returns
/// One outcome per graph. An unavailable tool yields `Skipped` for both
/// and writes nothing.
pub fn generate_graphs(
    tool: &dyn RenderTool,
    stacks: &Path,
    flame_path: &Path,
    icicle_path: &Path,
    title_prefix: &str,
    counter: Counter,
) -> GraphSet {
    if !tool.is_available() {
        warn!("{} is not available, skipping graph generation", tool.name());
        return GraphSet::skipped();
    }

    let flame = render_graph(tool, stacks, flame_path, &GraphOptions::flame(title_prefix, counter));
    let icicle = render_graph(
        tool,
        stacks,
        icicle_path,
        &GraphOptions::icicle(title_prefix, counter),
    );

    GraphSet { flame, icicle }
}

fn render_graph(
    tool: &dyn RenderTool,
    stacks: &Path,
    output: &Path,
    options: &GraphOptions,
) -> GraphOutcome {
    info!("Rendering {} with {}", options.title, tool.name());

    match tool.render(stacks, output, options) {
        Ok(()) => {
            info!("✓ {} written to: {}", options.title, output.display());
            GraphOutcome::Rendered(output.to_path_buf())
        }
        Err(e) => {
            error!("Failed to render {}: {}", options.title, e);
            GraphOutcome::Failed(e)
        }
    }
}
