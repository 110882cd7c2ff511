//! SVG graph output files.
//!
//! Opens graph destinations with proper validation, and cleans up after
//! failed renders so a half-written graph is never left behind.

use crate::utils::error::OutputError;
use log::{debug, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Open an SVG file for writing
///
/// **Public** - used by the in-process renderer
///
/// # Arguments
/// * `output_path` - Path to output SVG file
///
/// # Returns
/// A buffered writer over the freshly truncated file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error while creating the file
/// * `OutputError::InvalidPath` - Path is invalid
pub fn create_svg_file(output_path: impl AsRef<Path>) -> Result<BufWriter<File>, OutputError> {
    let output_path = output_path.as_ref();

    debug!("Opening SVG for writing: {}", output_path.display());

    validate_svg_path(output_path)?;
    ensure_parent_dir(output_path)?;

    let file = File::create(output_path)
        .map_err(OutputError::WriteFailed)?;

    Ok(BufWriter::new(file))
}

/// Create the parent directory of `path` if it does not exist yet
pub fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::InvalidPath(format!(
                    "Cannot create directory: {}",
                    e
                )))?;
        }
    }
    Ok(())
}

/// Remove a graph left behind by a failed render
pub fn discard_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Could not remove partial graph {}: {}", path.display(), e);
        }
    }
}

/// Validate output path for SVG
///
/// **Private** - internal validation
fn validate_svg_path(path: &Path) -> Result<(), OutputError> {
    // Check if path is empty
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if path.extension().is_some_and(|ext| ext != "svg") {
        debug!("Warning: File does not have .svg extension: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_create_svg_file_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/flames.svg");

        let mut writer = create_svg_file(&nested_path).unwrap();
        writer.write_all(b"<svg/>").unwrap();
        writer.flush().unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_validate_svg_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = validate_svg_path(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_discard_partial() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.svg");
        std::fs::write(&path, "<svg").unwrap();

        discard_partial(&path);
        assert!(!path.exists());

        // Missing files are fine
        discard_partial(&path);
    }
}
