//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod record;
pub mod utils;

// Re-export main command functions
pub use models::{RecordArgs, RendererKind};
pub use record::{execute_record, validate_args};
pub use utils::{display_version, execute_render, execute_sanitize};
