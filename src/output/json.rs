//! JSON session report writer.
//!
//! Writes SessionReport structs to JSON files with proper formatting.

use crate::session::report::SessionReport;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a session report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `report` - Report data to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(report: &SessionReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing session report to: {}", output_path.display());

    validate_output_path(output_path)?;
    super::svg::ensure_parent_dir(output_path)?;

    let file = File::create(output_path)
        .map_err(OutputError::WriteFailed)?;

    let mut writer = BufWriter::new(file);

    // Serialize to JSON with pretty printing
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(OutputError::SerializationFailed)?;
    writer.flush()?;

    info!("Report written successfully ({} bytes)",
          calculate_file_size(output_path));

    Ok(())
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path)
        .map(|m| m.len())
        .unwrap_or(0)
}

/// Read a session report from a JSON file
///
/// **Public** - useful for validation and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report(input_path: impl AsRef<Path>) -> Result<SessionReport, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading session report from: {}", input_path.display());

    let file = File::open(input_path)
        .map_err(OutputError::WriteFailed)?;

    let report: SessionReport = serde_json::from_reader(BufReader::new(file))
        .map_err(OutputError::SerializationFailed)?;

    debug!("Report loaded: version {}, pid {}",
           report.version,
           report.pid);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::config::Counter;
    use crate::session::report::GraphReport;
    use crate::session::target::InvocationMode;
    use crate::stacks::SanitizeStats;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn create_test_report() -> SessionReport {
        SessionReport {
            version: "1.0.0".to_string(),
            profiler: "async profiler".to_string(),
            pid: "4242".to_string(),
            mode: InvocationMode::Daemon,
            event: "cpu".to_string(),
            counter: Counter::Samples,
            raw_stacks: PathBuf::from("/out/p.stacks.txt"),
            sanitized_stacks: PathBuf::from("/out/p.simplified-stacks.txt"),
            stacks: SanitizeStats { read: 10, kept: 8, dropped: 2 },
            flame_graph: GraphReport::Rendered { path: PathBuf::from("/out/p-flames.svg") },
            icicle_graph: GraphReport::Failed { error: "flamegraph.pl exited with status 1".to_string() },
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_write_and_read_report() {
        let report = create_test_report();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_report(&report, path).unwrap();
        let loaded = read_report(path).unwrap();

        assert_eq!(loaded, report);
    }

    #[test]
    fn test_graph_report_is_tagged() {
        let json = serde_json::to_value(GraphReport::Skipped).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "skipped" }));
    }

    #[test]
    fn test_validate_output_path_empty() {
        let result = validate_output_path(Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = validate_output_path(temp_dir.path());
        assert!(result.is_err());
    }
}
