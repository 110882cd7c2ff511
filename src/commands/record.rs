//! Record command implementation.
//!
//! The record command:
//! 1. Starts async-profiler on the target
//! 2. Waits for the recording window
//! 3. Stops the agent and sanitizes the stacks
//! 4. Renders flame and icicle graphs
//! 5. Writes the session report

use super::models::RecordArgs;
use crate::output::write_report;
use crate::session::{
    InvocationMode, ProfilerController, ScenarioOutput, SessionReport, SessionTarget, SystemExec,
};
use anyhow::{Context, Result};
use log::info;
use std::io::BufRead;
use std::time::Duration;

/// Execute the record command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Agent start/stop failures
/// * Missing or malformed collapsed stacks
/// * Report write errors
/// * Any graph that failed to render (after both were attempted)
pub fn execute_record(args: RecordArgs) -> Result<SessionReport> {
    let output = ScenarioOutput::new(&args.output_dir, &args.profile_name);
    let target = SessionTarget::new(&args.pid, args.mode);
    let renderer = args.renderer.build(&args.flamegraph_script);

    let mut controller = ProfilerController::new(
        args.config.clone(),
        target.clone(),
        output.clone(),
        SystemExec,
        renderer,
    );

    controller
        .start()
        .with_context(|| format!("Failed to start {} on pid {}", controller.name(), args.pid))?;

    wait_for_recording(args.duration_secs)?;

    let outcome = controller.stop().context("Failed to complete profiling session")?;
    let report = SessionReport::new(&args.config, &target, &outcome);

    write_report(&report, output.report()).context("Failed to write session report")?;
    info!("✓ Session report written to: {}", output.report().display());

    let errors = outcome.graphs.errors();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Graph rendering failed: {}", messages.join("; "));
    }

    Ok(report)
}

/// Block for the recording window
///
/// **Private** - internal helper for execute_record
fn wait_for_recording(duration_secs: u64) -> Result<()> {
    if duration_secs > 0 {
        info!("Recording for {}s...", duration_secs);
        std::thread::sleep(Duration::from_secs(duration_secs));
    } else {
        println!("Recording. Press Enter to stop profiling...");
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
    }
    Ok(())
}

/// Validate record arguments
///
/// **Public** - can be called before execute_record for early validation
pub fn validate_args(args: &RecordArgs) -> Result<()> {
    if args.pid.is_empty() {
        anyhow::bail!("pid cannot be empty");
    }

    if args.mode == InvocationMode::Daemon && !args.pid.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("pid must be numeric when profiling a separate process");
    }

    if args.profile_name.is_empty() {
        anyhow::bail!("profile name cannot be empty");
    }

    if args.profile_name.contains(['/', '\\']) {
        anyhow::bail!("profile name must not contain path separators");
    }

    if args.config.event.is_empty() {
        anyhow::bail!("event cannot be empty");
    }

    if args.config.interval == 0 {
        anyhow::bail!("interval must be greater than 0");
    }

    if args.config.stack_depth == 0 {
        anyhow::bail!("stack depth must be greater than 0");
    }

    Ok(())
}
