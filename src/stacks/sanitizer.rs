//! Stack sanitization before rendering.
//!
//! Raw async-profiler output is noisy: GC workers, generated build script
//! classes and reflective dispatch frames all fan out into thousands of
//! distinct call sites. The sanitizer rewrites each stack through a fixed,
//! ordered list of rules so the resulting graph stays readable.
//!
//! Rule order matters. `RemoveSystemThreads` must see the raw frame text,
//! and `SimpleNames` must run last so that the substring rules still see
//! fully-qualified names.

use super::collapsed::Stack;
use crate::utils::config::{
    BUILD_OPERATION_MARKERS, DYNAMIC_INVOCATION_MARKERS, SYSTEM_THREAD_MARKERS,
};
use crate::utils::error::FormatError;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;
use tempfile::NamedTempFile;

static BUILD_SCRIPT_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bbuild_[a-z0-9]{10,}", "build script"),
        (r"\bsettings_[a-z0-9]{10,}", "settings script"),
        (r"\binit_[a-z0-9]{10,}", "init script"),
        (r"\bBuild_gradle\b", "build script"),
        (r"\bSettings_gradle\b", "settings script"),
        (r"\bProgram\.execute\b", "build script"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).expect("valid build script pattern"), label))
    .collect()
});

// Lowercase package segments (dotted or JVM-internal slashed) ahead of a class name
static PACKAGE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z_$][a-z0-9_$]*[./])+([A-Z].*)$").expect("valid package pattern")
});

/// A single stack rewriting rule
///
/// **Public** - the rule set is closed; see `Sanitizer::for_config` for ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeRule {
    /// Drop stacks that pass through a GC worker or VM-internal thread
    RemoveSystemThreads,
    /// Fold generated build/settings/init script frames into one label each
    CollapseBuildScripts,
    /// Fold build operation plumbing and dynamic dispatch into one label each
    CollapseInfrastructure,
    /// Strip package qualifiers from frame names
    SimpleNames,
}

impl SanitizeRule {
    /// Apply the rule to one stack's frames
    ///
    /// # Returns
    /// `None` when the stack should be dropped entirely
    pub fn apply(&self, frames: Vec<String>) -> Option<Vec<String>> {
        let frames = match self {
            Self::RemoveSystemThreads => {
                let is_system = frames
                    .iter()
                    .any(|frame| SYSTEM_THREAD_MARKERS.iter().any(|m| frame.contains(m)));
                if is_system {
                    return None;
                }
                frames
            }
            Self::CollapseBuildScripts => collapse(frames, build_script_label),
            Self::CollapseInfrastructure => collapse(frames, infrastructure_label),
            Self::SimpleNames => frames.into_iter().map(simple_name).collect(),
        };

        (!frames.is_empty()).then_some(frames)
    }
}

fn build_script_label(frame: &str) -> Option<&'static str> {
    BUILD_SCRIPT_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(frame))
        .map(|(_, label)| *label)
}

fn infrastructure_label(frame: &str) -> Option<&'static str> {
    if BUILD_OPERATION_MARKERS.iter().any(|m| frame.contains(m)) {
        Some("build operations")
    } else if DYNAMIC_INVOCATION_MARKERS.iter().any(|m| frame.contains(m)) {
        Some("dynamic invocation")
    } else {
        None
    }
}

/// Replace matching frames by their label, coalescing adjacent repeats
fn collapse(frames: Vec<String>, label_for: fn(&str) -> Option<&'static str>) -> Vec<String> {
    let mut out = Vec::with_capacity(frames.len());
    let mut previous: Option<&'static str> = None;

    for frame in frames {
        match label_for(&frame) {
            Some(label) if previous == Some(label) => {}
            Some(label) => {
                out.push(label.to_string());
                previous = Some(label);
            }
            None => {
                out.push(frame);
                previous = None;
            }
        }
    }

    out
}

fn simple_name(frame: String) -> String {
    match PACKAGE_PREFIX.captures(&frame) {
        Some(caps) => caps[1].to_string(),
        None => frame,
    }
}

/// Counts gathered while sanitizing one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeStats {
    /// Stacks parsed from the input
    pub read: usize,
    /// Stacks written to the output
    pub kept: usize,
    /// Stacks removed by a rule
    pub dropped: usize,
}

/// Ordered chain of sanitize rules
#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: Vec<SanitizeRule>,
}

impl Sanitizer {
    /// Build a sanitizer with an explicit rule order
    pub fn new(rules: Vec<SanitizeRule>) -> Self {
        Self { rules }
    }

    /// Build the standard rule chain for a profiling session
    ///
    /// **Public** - the only place where the system thread rule is toggled
    pub fn for_config(include_system_threads: bool) -> Self {
        let mut rules = Vec::with_capacity(4);
        if !include_system_threads {
            rules.push(SanitizeRule::RemoveSystemThreads);
        }
        rules.extend([
            SanitizeRule::CollapseBuildScripts,
            SanitizeRule::CollapseInfrastructure,
            SanitizeRule::SimpleNames,
        ]);
        Self::new(rules)
    }

    pub fn rules(&self) -> &[SanitizeRule] {
        &self.rules
    }

    /// Run one stack through every rule in order
    ///
    /// # Returns
    /// The rewritten stack with its weight untouched, or `None` if dropped
    pub fn sanitize_stack(&self, stack: Stack) -> Option<Stack> {
        let Stack { mut frames, weight } = stack;
        for rule in &self.rules {
            frames = rule.apply(frames)?;
        }
        Some(Stack::new(frames, weight))
    }

    /// Sanitize collapsed-stack text from a reader into a writer
    ///
    /// **Public** - streaming core used by `sanitize`
    ///
    /// Blank lines are skipped. Everything else must parse as a stack.
    ///
    /// # Errors
    /// * `FormatError::Malformed` - a line without a numeric weight
    /// * `FormatError::Io` - read or write failure
    pub fn sanitize_lines<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
    ) -> Result<SanitizeStats, FormatError> {
        let mut stats = SanitizeStats::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let stack = Stack::parse(&line, index + 1)?;
            stats.read += 1;

            match self.sanitize_stack(stack) {
                Some(stack) => {
                    writeln!(writer, "{}", stack.to_line())?;
                    stats.kept += 1;
                }
                None => stats.dropped += 1,
            }
        }

        writer.flush()?;
        Ok(stats)
    }

    /// Sanitize a raw collapsed-stack file into `output`
    ///
    /// **Public** - main entry point for the pipeline
    ///
    /// Output is staged in a temporary file next to `output` and only moved
    /// into place once every line has been processed. On error, `output` is
    /// neither created nor modified.
    ///
    /// # Arguments
    /// * `input` - Raw collapsed stacks written by the agent
    /// * `output` - Destination for the sanitized stacks
    pub fn sanitize(&self, input: &Path, output: &Path) -> Result<SanitizeStats, FormatError> {
        info!("Sanitizing stacks: {} -> {}", input.display(), output.display());
        debug!("Sanitize rules: {:?}", self.rules);

        let reader = BufReader::new(File::open(input)?);

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let staged = staging_file(dir)?;
        let stats = self.sanitize_lines(reader, BufWriter::new(staged.as_file()))?;
        staged.persist(output).map_err(|e| FormatError::Io(e.error))?;

        info!(
            "Sanitized {} stacks ({} kept, {} dropped)",
            stats.read, stats.kept, stats.dropped
        );
        Ok(stats)
    }
}

/// Temporary file for the sanitized output, in the directory it will be persisted to
fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;

        // Same creation mode as File::create; the process umask still applies
        builder.permissions(Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
