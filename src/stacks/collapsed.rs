//! Collapsed stack model.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "root;caller;leaf weight"
//!
//! Example: "java.lang.Thread.run;Worker.execute;Task.compile 1000"
//! Frames run root to leaf; the weight is the number of samples (or units)
//! attributed to that exact path.

use crate::utils::config::FRAME_DELIMITER;
use crate::utils::error::FormatError;

/// A single collapsed stack entry
///
/// **Public** - flows through the sanitizer and back out to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    /// Frame labels, root first
    pub frames: Vec<String>,

    /// Sample weight, carried through rewriting untouched
    pub weight: u64,
}

impl Stack {
    /// Create a new stack
    pub fn new(frames: Vec<String>, weight: u64) -> Self {
        Self { frames, weight }
    }

    /// Parse one line of collapsed-stack text
    ///
    /// **Public** - used by the sanitizer and tests
    ///
    /// The weight is split off at the last space, since frame labels
    /// themselves may contain spaces (thread names, for instance).
    ///
    /// # Arguments
    /// * `line` - Line content without the trailing newline
    /// * `line_number` - 1-based position, reported on error
    ///
    /// # Errors
    /// * `FormatError::Malformed` - no numeric weight, or no frames
    pub fn parse(line: &str, line_number: usize) -> Result<Self, FormatError> {
        let malformed = || FormatError::Malformed {
            line: line_number,
            content: line.to_string(),
        };

        let trimmed = line.trim_end();
        let (frames, weight) = trimmed.rsplit_once(' ').ok_or_else(malformed)?;
        let weight: u64 = weight.parse().map_err(|_| malformed())?;

        if frames.is_empty() {
            return Err(malformed());
        }

        let frames = frames
            .split(FRAME_DELIMITER)
            .map(str::to_string)
            .collect();

        Ok(Self { frames, weight })
    }

    /// Render back into a collapsed-stack line (no newline)
    pub fn to_line(&self) -> String {
        format!("{} {}", self.frames.join(FRAME_DELIMITER), self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_line() {
        let stack = Stack::parse("main;execute;storage_read 1000", 1).unwrap();
        assert_eq!(stack.frames, vec!["main", "execute", "storage_read"]);
        assert_eq!(stack.weight, 1000);
    }

    #[test]
    fn test_parse_frames_with_spaces() {
        let stack = Stack::parse("[GC Thread#0 tid=42];start_thread 7", 3).unwrap();
        assert_eq!(stack.frames, vec!["[GC Thread#0 tid=42]", "start_thread"]);
        assert_eq!(stack.weight, 7);
    }

    #[test]
    fn test_to_line() {
        let stack = Stack::new(vec!["a".to_string(), "b".to_string()], 12);
        assert_eq!(stack.to_line(), "a;b 12");
    }

    #[test]
    fn test_parse_missing_weight() {
        let err = Stack::parse("a;b;c", 4).unwrap_err();
        assert!(matches!(err, FormatError::Malformed { line: 4, .. }));
    }

    #[test]
    fn test_parse_non_numeric_weight() {
        assert!(Stack::parse("a;b many", 1).is_err());
        assert!(Stack::parse("a;b -3", 1).is_err());
    }

    #[test]
    fn test_parse_weight_only() {
        assert!(Stack::parse(" 5", 1).is_err());
    }
}
