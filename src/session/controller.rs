//! async-profiler session controller.
//!
//! A controller drives exactly one recording:
//! 1. `start` asks the agent to begin sampling the target
//! 2. `stop` asks the agent to flush collapsed stacks to disk
//! 3. The stacks are sanitized
//! 4. Flame and icicle graphs are rendered
//!
//! Only `stop` produces output, so all post-processing hangs off it.

use super::config::ProfilerConfig;
use super::exec::{CommandExec, Invocation};
use super::target::{ScenarioOutput, SessionTarget};
use crate::flamegraph::{generate_graphs, GraphSet, RenderTool};
use crate::stacks::{SanitizeStats, Sanitizer};
use crate::utils::config::PROFILER_NAME;
use crate::utils::error::SessionError;
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Lifecycle of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    /// Terminal; the controller cannot be reused
    Stopped,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a finished session produced
#[derive(Debug)]
pub struct SessionOutcome {
    pub raw_stacks: PathBuf,
    pub sanitized_stacks: PathBuf,
    pub stats: SanitizeStats,
    pub graphs: GraphSet,
}

/// Controls a single async-profiler recording against one target process
pub struct ProfilerController {
    config: ProfilerConfig,
    target: SessionTarget,
    output: ScenarioOutput,
    sanitizer: Sanitizer,
    exec: Box<dyn CommandExec>,
    renderer: Box<dyn RenderTool>,
    state: SessionState,
}

impl ProfilerController {
    /// Create a controller for one session
    ///
    /// **Public** - the sanitize rule chain is fixed here from the config
    pub fn new(
        config: ProfilerConfig,
        target: SessionTarget,
        output: ScenarioOutput,
        exec: impl CommandExec + 'static,
        renderer: impl RenderTool + 'static,
    ) -> Self {
        let sanitizer = Sanitizer::for_config(config.include_system_threads);
        Self {
            config,
            target,
            output,
            sanitizer,
            exec: Box::new(exec),
            renderer: Box::new(renderer),
            state: SessionState::Idle,
        }
    }

    pub fn name(&self) -> &'static str {
        PROFILER_NAME
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Begin recording
    ///
    /// In embedded mode the agent is already attached, so no command is sent.
    ///
    /// # Errors
    /// * `SessionError::IllegalState` - called more than once
    /// * `SessionError::ProfilerInvocation` - the start command failed
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_state("start", SessionState::Idle)?;

        if let Err(e) = self.begin() {
            self.state = SessionState::Stopped;
            return Err(e);
        }

        self.state = SessionState::Recording;
        Ok(())
    }

    fn begin(&self) -> Result<(), SessionError> {
        std::fs::create_dir_all(self.output.output_dir()).map_err(|e| SessionError::Capture {
            path: self.output.output_dir().to_path_buf(),
            reason: format!("cannot create output directory: {e}"),
        })?;

        if self.target.is_separate_process() {
            info!("Starting {} on pid {}", self.name(), self.target.pid);
            self.run_agent(&self.start_command())
        } else {
            debug!("Embedded target, agent is already attached");
            Ok(())
        }
    }

    /// Stop recording and post-process the captured stacks
    ///
    /// The controller is `Stopped` afterwards whatever the result. In daemon
    /// mode a raw stack file left by an earlier session is removed before the
    /// agent is asked to flush.
    ///
    /// # Returns
    /// Paths and per-graph outcomes. Render failures are reported inside
    /// the outcome rather than as an error.
    ///
    /// # Errors
    /// * `SessionError::IllegalState` - not currently recording
    /// * `SessionError::ProfilerInvocation` - the stop command failed
    /// * `SessionError::Capture` - no collapsed stack file was produced
    /// * `SessionError::Sanitize` - the stack file could not be parsed
    pub fn stop(&mut self) -> Result<SessionOutcome, SessionError> {
        self.expect_state("stop", SessionState::Recording)?;
        self.state = SessionState::Stopped;

        let start_time = Instant::now();
        let raw_stacks = self.raw_stacks_path()?;

        if self.target.is_separate_process() {
            info!("Step 1/3: Stopping {} on pid {}", self.name(), self.target.pid);
            clear_stale_stacks(&raw_stacks)?;
            self.run_agent(&self.stop_command(&raw_stacks))?;
        } else {
            info!("Step 1/3: Embedded target, using stacks already at {}", raw_stacks.display());
        }

        if !raw_stacks.is_file() {
            return Err(SessionError::Capture {
                path: raw_stacks,
                reason: "file is missing".to_string(),
            });
        }

        info!("Step 2/3: Sanitizing collapsed stacks...");
        let sanitized_stacks = self.output.sanitized_stacks();
        let stats = self.sanitizer.sanitize(&raw_stacks, &sanitized_stacks)?;

        info!("Step 3/3: Generating graphs...");
        let graphs = generate_graphs(
            self.renderer.as_ref(),
            &sanitized_stacks,
            &self.output.flame_graph(),
            &self.output.icicle_graph(),
            &self.config.title_prefix(),
            self.config.counter,
        );

        info!("Session post-processing completed in {:.2}s", start_time.elapsed().as_secs_f64());

        Ok(SessionOutcome {
            raw_stacks,
            sanitized_stacks,
            stats,
            graphs,
        })
    }

    /// `start -e <event> -i <interval> -j <depth> -b <buffer> <pid>`
    pub fn start_command(&self) -> Invocation {
        Invocation::new(
            self.config.control_script(),
            vec![
                "start".to_string(),
                "-e".to_string(),
                self.config.event.clone(),
                "-i".to_string(),
                self.config.interval.to_string(),
                "-j".to_string(),
                self.config.stack_depth.to_string(),
                "-b".to_string(),
                self.config.frame_buffer.to_string(),
                self.target.pid.clone(),
            ],
        )
    }

    /// `stop -o collapsed=<counter> -a -f <file> <pid>`
    pub fn stop_command(&self, raw_stacks: &Path) -> Invocation {
        Invocation::new(
            self.config.control_script(),
            vec![
                "stop".to_string(),
                "-o".to_string(),
                format!("collapsed={}", self.config.counter.as_str()),
                "-a".to_string(),
                "-f".to_string(),
                raw_stacks.display().to_string(),
                self.target.pid.clone(),
            ],
        )
    }

    // The agent resolves relative paths against the target's working directory
    fn raw_stacks_path(&self) -> Result<PathBuf, SessionError> {
        let raw = self.output.raw_stacks();
        std::path::absolute(&raw).map_err(|e| SessionError::Capture {
            path: raw,
            reason: e.to_string(),
        })
    }

    fn run_agent(&self, invocation: &Invocation) -> Result<(), SessionError> {
        let failed = |reason: String| SessionError::ProfilerInvocation {
            command: invocation.to_string(),
            reason,
        };

        match self.exec.execute(invocation) {
            Ok(Some(0)) => Ok(()),
            Ok(Some(code)) => Err(failed(format!("exit status {code}"))),
            Ok(None) => Err(failed("terminated by signal".to_string())),
            Err(e) => Err(failed(e.to_string())),
        }
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: SessionState,
    ) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::IllegalState {
                operation,
                state: self.state.as_str(),
            })
        }
    }
}

/// Remove stacks left by an earlier session so only this flush can satisfy the capture check
fn clear_stale_stacks(raw_stacks: &Path) -> Result<(), SessionError> {
    match std::fs::remove_file(raw_stacks) {
        Ok(()) => {
            debug!("Removed stale stacks at {}", raw_stacks.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SessionError::Capture {
            path: raw_stacks.to_path_buf(),
            reason: format!("cannot remove stale stacks: {e}"),
        }),
    }
}

impl fmt::Debug for ProfilerController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilerController")
            .field("config", &self.config)
            .field("target", &self.target)
            .field("output", &self.output)
            .field("renderer", &self.renderer.name())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flamegraph::InfernoRenderer;
    use crate::session::config::Counter;
    use crate::session::exec::SystemExec;
    use crate::session::target::InvocationMode;

    fn controller(mode: InvocationMode) -> ProfilerController {
        let config = ProfilerConfig {
            event: "wall".to_string(),
            interval: 5_000_000,
            stack_depth: 512,
            frame_buffer: 1_000_000,
            counter: Counter::Total,
            ..ProfilerConfig::new("/opt/ap")
        };
        ProfilerController::new(
            config,
            SessionTarget::new("4242", mode),
            ScenarioOutput::new("/tmp/out", "scenario"),
            SystemExec,
            InfernoRenderer,
        )
    }

    #[test]
    fn test_start_command() {
        let invocation = controller(InvocationMode::Daemon).start_command();
        assert_eq!(invocation.program, PathBuf::from("/opt/ap/profiler.sh"));
        assert_eq!(
            invocation.args,
            vec!["start", "-e", "wall", "-i", "5000000", "-j", "512", "-b", "1000000", "4242"]
        );
    }

    #[test]
    fn test_stop_command() {
        let invocation =
            controller(InvocationMode::Daemon).stop_command(Path::new("/tmp/out/scenario.stacks.txt"));
        assert_eq!(
            invocation.args,
            vec![
                "stop",
                "-o",
                "collapsed=total",
                "-a",
                "-f",
                "/tmp/out/scenario.stacks.txt",
                "4242"
            ]
        );
    }

    #[test]
    fn test_stop_before_start_is_illegal() {
        let mut controller = controller(InvocationMode::Embedded);
        let err = controller.stop().unwrap_err();
        assert!(matches!(
            err,
            SessionError::IllegalState { operation: "stop", state: "idle" }
        ));
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn test_name() {
        assert_eq!(controller(InvocationMode::Embedded).name(), "async profiler");
    }
}
