//! Profiler Flames CLI
//!
//! Records async-profiler sessions and renders flame and icicle graphs
//! from the collapsed stacks they produce.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use profiler_flames::commands::{
    display_version, execute_record, execute_render, execute_sanitize, validate_args, RecordArgs,
    RendererKind,
};
use profiler_flames::session::{Counter, InvocationMode, ProfilerConfig, ScenarioOutput};
use profiler_flames::utils::config::DEFAULT_FLAMEGRAPH_SCRIPT;

/// Profiler Flames - async-profiler sessions to flame graphs
#[derive(Parser, Debug)]
#[command(name = "profiler-flames")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Graph renderer selection shared by record and render
#[derive(Args, Debug)]
struct RendererArgs {
    /// Graph renderer backend
    #[arg(long, value_enum, default_value_t = RendererKind::Script)]
    renderer: RendererKind,

    /// flamegraph.pl-compatible script used by the script renderer
    #[arg(long, env = "FLAMEGRAPH_SCRIPT", default_value = DEFAULT_FLAMEGRAPH_SCRIPT)]
    flamegraph_script: PathBuf,
}

/// async-profiler settings; explicit flags override the config file
#[derive(Args, Debug)]
struct ProfilerArgs {
    /// JSON file with profiler settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// async-profiler installation directory
    #[arg(long, env = "ASYNC_PROFILER_HOME")]
    profiler_home: Option<PathBuf>,

    /// Sampling event
    #[arg(short, long)]
    event: Option<String>,

    /// Sampling interval
    #[arg(short, long)]
    interval: Option<u64>,

    /// Maximum stack depth
    #[arg(long)]
    stack_depth: Option<u32>,

    /// Agent frame buffer size
    #[arg(long)]
    frame_buffer: Option<u64>,

    /// Counter used for collapsed output
    #[arg(long, value_enum)]
    counter: Option<Counter>,

    /// Keep GC and VM-internal thread stacks (`=false` overrides the config file)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    include_system_threads: Option<bool>,
}

impl ProfilerArgs {
    /// Load the config file (or defaults) and apply explicit flags on top
    fn resolve(self) -> Result<ProfilerConfig> {
        let mut profiler = match &self.config {
            Some(path) => ProfilerConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ProfilerConfig::default(),
        };

        if let Some(home) = self.profiler_home {
            profiler.profiler_home = home;
        }
        if let Some(event) = self.event {
            profiler.event = event;
        }
        if let Some(interval) = self.interval {
            profiler.interval = interval;
        }
        if let Some(stack_depth) = self.stack_depth {
            profiler.stack_depth = stack_depth;
        }
        if let Some(frame_buffer) = self.frame_buffer {
            profiler.frame_buffer = frame_buffer;
        }
        if let Some(counter) = self.counter {
            profiler.counter = counter;
        }
        if let Some(include) = self.include_system_threads {
            profiler.include_system_threads = include;
        }

        Ok(profiler)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a profiling session and render its graphs
    Record {
        /// Process id of the profiled process
        #[arg(short, long)]
        pid: String,

        /// The agent was attached at launch; send no start/stop commands
        #[arg(long)]
        embedded: bool,

        /// Directory for all session artifacts
        #[arg(short, long, default_value = "profile-out")]
        output_dir: PathBuf,

        /// Base name of the session artifacts
        #[arg(short = 'n', long, default_value = "profile")]
        profile_name: String,

        /// Seconds to record (0 waits for Enter)
        #[arg(short, long, default_value = "0")]
        duration: u64,

        #[command(flatten)]
        profiler: ProfilerArgs,

        #[command(flatten)]
        render: RendererArgs,
    },

    /// Sanitize a raw collapsed-stack file
    Sanitize {
        /// Raw collapsed stacks
        #[arg(short, long)]
        input: PathBuf,

        /// Destination for the sanitized stacks
        #[arg(short, long)]
        output: PathBuf,

        /// Keep GC and VM-internal thread stacks
        #[arg(long)]
        include_system_threads: bool,
    },

    /// Render flame and icicle graphs from sanitized stacks
    Render {
        /// Sanitized collapsed stacks
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the graphs
        #[arg(short, long, default_value = "profile-out")]
        output_dir: PathBuf,

        /// Base name of the graph files
        #[arg(short = 'n', long, default_value = "profile")]
        profile_name: String,

        /// Event name used in graph titles
        #[arg(short, long, default_value = "cpu")]
        event: String,

        /// Counter the stacks were collected with
        #[arg(long, value_enum, default_value_t = Counter::Samples)]
        counter: Counter,

        #[command(flatten)]
        render: RendererArgs,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Record {
            pid,
            embedded,
            output_dir,
            profile_name,
            duration,
            profiler,
            render,
        } => {
            let profiler = profiler.resolve()?;

            let mode = if embedded {
                InvocationMode::Embedded
            } else {
                InvocationMode::Daemon
            };

            if mode == InvocationMode::Daemon && profiler.profiler_home.as_os_str().is_empty() {
                anyhow::bail!("--profiler-home (or ASYNC_PROFILER_HOME) is required to control the agent");
            }

            let args = RecordArgs {
                pid,
                mode,
                output_dir,
                profile_name,
                duration_secs: duration,
                config: profiler,
                renderer: render.renderer,
                flamegraph_script: render.flamegraph_script,
            };

            // Validate args first
            validate_args(&args)?;

            let report = execute_record(args)?;
            println!(
                "Captured {} stacks ({} kept, {} dropped)",
                report.stacks.read, report.stacks.kept, report.stacks.dropped
            );
        }

        Commands::Sanitize {
            input,
            output,
            include_system_threads,
        } => {
            let stats = execute_sanitize(&input, &output, include_system_threads)?;
            println!(
                "Sanitized {} stacks ({} kept, {} dropped)",
                stats.read, stats.kept, stats.dropped
            );
        }

        Commands::Render {
            input,
            output_dir,
            profile_name,
            event,
            counter,
            render,
        } => {
            let output = ScenarioOutput::new(output_dir, profile_name);
            execute_render(
                &input,
                &output,
                &event,
                counter,
                render.renderer,
                &render.flamegraph_script,
            )?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
