//! Blocking external process execution.
//!
//! Both the agent control script and the external flamegraph script are
//! driven through `CommandExec`, so tests can record invocations instead of
//! spawning real processes.

use log::debug;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A single external command to run to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Redirect stdout into this file instead of inheriting it
    pub stdout: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdout: None,
        }
    }

    pub fn with_stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        if let Some(stdout) = &self.stdout {
            write!(f, " > {}", stdout.display())?;
        }
        Ok(())
    }
}

/// Runs an external command and reports its exit code
pub trait CommandExec: Send + Sync {
    /// Run `invocation`, blocking until it exits
    ///
    /// # Returns
    /// The exit code, or `None` if the process was killed by a signal
    ///
    /// # Errors
    /// Any failure to launch the process
    fn execute(&self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

/// `CommandExec` backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExec;

impl CommandExec for SystemExec {
    fn execute(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        debug!("Running: {}", invocation);

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdin(Stdio::null());
        if let Some(path) = &invocation.stdout {
            command.stdout(File::create(path)?);
        }

        let status = command.status()?;
        debug!("{} exited with {}", invocation.program.display(), status);
        Ok(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation::new("/opt/ap/profiler.sh", vec!["stop".into(), "42".into()])
            .with_stdout("/tmp/out.svg");
        assert_eq!(invocation.to_string(), "/opt/ap/profiler.sh stop 42 > /tmp/out.svg");
    }

    #[test]
    fn test_launch_failure_is_an_error() {
        let invocation = Invocation::new("/definitely/not/a/real/binary", Vec::new());
        assert!(SystemExec.execute(&invocation).is_err());
    }
}
