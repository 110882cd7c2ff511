//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a profiling session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("cannot {operation} while session is {state}")]
    IllegalState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("profiler command `{command}` failed: {reason}")]
    ProfilerInvocation { command: String, reason: String },

    #[error("no collapsed stacks captured at {}: {reason}", .path.display())]
    Capture { path: PathBuf, reason: String },

    #[error("sanitizing stacks failed: {0}")]
    Sanitize(#[from] FormatError),
}

/// Errors that can occur while reading or rewriting collapsed stacks
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("malformed collapsed stack at line {line}: {content:?}")]
    Malformed { line: usize, content: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during flamegraph rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    Exit { program: String, code: Option<i32> },

    #[error("inferno failed to render: {0}")]
    Inferno(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
