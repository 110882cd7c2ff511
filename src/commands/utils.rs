use super::models::RendererKind;
use crate::flamegraph::generate_graphs;
use crate::session::{Counter, ScenarioOutput};
use crate::stacks::{SanitizeStats, Sanitizer};
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Sanitize a raw collapsed-stack file without running a session
pub fn execute_sanitize(
    input: &Path,
    output: &Path,
    include_system_threads: bool,
) -> Result<SanitizeStats> {
    let stats = Sanitizer::for_config(include_system_threads)
        .sanitize(input, output)
        .with_context(|| format!("Failed to sanitize {}", input.display()))?;

    info!("✓ Sanitized stacks written to: {}", output.display());
    Ok(stats)
}

/// Render flame and icicle graphs from an already sanitized file
pub fn execute_render(
    input: &Path,
    output: &ScenarioOutput,
    event: &str,
    counter: Counter,
    renderer: RendererKind,
    flamegraph_script: &Path,
) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("Stack file not found: {}", input.display());
    }

    let tool = renderer.build(flamegraph_script);
    let graphs = generate_graphs(
        tool.as_ref(),
        input,
        &output.flame_graph(),
        &output.icicle_graph(),
        &event.to_uppercase(),
        counter,
    );

    println!("Flame graph:  {}", graphs.flame);
    println!("Icicle graph: {}", graphs.icicle);

    let errors = graphs.errors();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Graph rendering failed: {}", messages.join("; "));
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Profiler Flames v{}", env!("CARGO_PKG_VERSION"));
    println!("Session Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Drives async-profiler and renders flame and icicle graphs.");
}
