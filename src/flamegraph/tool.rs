//! Flamegraph rendering backends.
//!
//! Two renderers are provided:
//! - `FlamegraphScript` drives an external `flamegraph.pl`-compatible command
//! - `InfernoRenderer` renders in-process using the inferno library

use super::generator::{ColorScheme, GraphOptions};
use crate::output::svg::{create_svg_file, discard_partial, ensure_parent_dir};
use crate::session::exec::{CommandExec, Invocation, SystemExec};
use crate::utils::error::RenderError;
use inferno::flamegraph::{self, color::MultiPalette, color::Palette, Direction, Options};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Something that can turn a collapsed-stack file into a graph
pub trait RenderTool: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether the renderer can be used at all
    fn is_available(&self) -> bool;

    /// Render `input` into `output`, blocking until done
    fn render(&self, input: &Path, output: &Path, options: &GraphOptions)
        -> Result<(), RenderError>;
}

impl<T: RenderTool + ?Sized> RenderTool for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn render(&self, input: &Path, output: &Path, options: &GraphOptions)
        -> Result<(), RenderError> {
        (**self).render(input, output, options)
    }
}

/// External `flamegraph.pl`-compatible renderer
///
/// Invoked as `<program> [flags...] <input>` with stdout written to the
/// output file.
pub struct FlamegraphScript {
    program: PathBuf,
    exec: Box<dyn CommandExec>,
}

impl FlamegraphScript {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_exec(program, SystemExec)
    }

    pub fn with_exec(program: impl Into<PathBuf>, exec: impl CommandExec + 'static) -> Self {
        Self {
            program: program.into(),
            exec: Box::new(exec),
        }
    }

    /// Command-line flags for one render, input path last
    pub fn arguments(input: &Path, options: &GraphOptions) -> Vec<String> {
        let mut args = Vec::new();
        if options.inverted {
            args.push("--reverse".to_string());
            args.push("--invert".to_string());
        }
        args.extend([
            "--colors".to_string(),
            options.colors.as_str().to_string(),
            "--minwidth".to_string(),
            options.min_width.to_string(),
            "--title".to_string(),
            options.title.clone(),
            "--countname".to_string(),
            options.count_name.clone(),
        ]);
        args.push(input.display().to_string());
        args
    }
}

impl RenderTool for FlamegraphScript {
    fn name(&self) -> &str {
        "flamegraph script"
    }

    fn is_available(&self) -> bool {
        // Bare names are looked up on PATH, anything else must exist as given
        if self.program.components().count() > 1 {
            return is_executable(&self.program);
        }
        std::env::var_os("PATH")
            .map(|paths| {
                std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(&self.program)))
            })
            .unwrap_or(false)
    }

    fn render(
        &self,
        input: &Path,
        output: &Path,
        options: &GraphOptions,
    ) -> Result<(), RenderError> {
        ensure_parent_dir(output)?;

        let invocation =
            Invocation::new(&self.program, Self::arguments(input, options)).with_stdout(output);
        let program = self.program.display().to_string();

        let code = match self.exec.execute(&invocation) {
            Ok(code) => code,
            Err(source) => {
                // The stdout file may already exist when the spawn fails
                discard_partial(output);
                return Err(RenderError::Launch { program, source });
            }
        };

        if code != Some(0) {
            discard_partial(output);
            return Err(RenderError::Exit { program, code });
        }
        Ok(())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// In-process renderer built on inferno
#[derive(Debug, Clone, Copy, Default)]
pub struct InfernoRenderer;

impl InfernoRenderer {
    /// Translate graph options into inferno's option set
    pub fn options(options: &GraphOptions) -> Options<'static> {
        let mut opts = Options::default();
        opts.title = options.title.clone();
        opts.count_name = options.count_name.clone();
        opts.min_width = f64::from(options.min_width);
        opts.colors = match options.colors {
            ColorScheme::Java => Palette::Multi(MultiPalette::Java),
        };
        if options.inverted {
            opts.reverse_stack_order = true;
            opts.direction = Direction::Inverted;
        }
        opts
    }
}

impl RenderTool for InfernoRenderer {
    fn name(&self) -> &str {
        "inferno"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn render(
        &self,
        input: &Path,
        output: &Path,
        options: &GraphOptions,
    ) -> Result<(), RenderError> {
        let lines = BufReader::new(File::open(input)?)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()?;
        let mut writer = create_svg_file(output)?;
        let mut opts = Self::options(options);

        debug!("Rendering {} stacks into {} with inferno", lines.len(), output.display());
        let rendered = flamegraph::from_lines(&mut opts, lines.iter().map(String::as_str), &mut writer)
            .map_err(|e| RenderError::Inferno(e.to_string()))
            .and_then(|()| writer.flush().map_err(RenderError::Io));

        if let Err(e) = rendered {
            drop(writer);
            discard_partial(output);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::config::Counter;

    #[test]
    fn test_script_arguments_flame() {
        let options = GraphOptions::flame("CPU", Counter::Samples);
        let args = FlamegraphScript::arguments(Path::new("in.txt"), &options);
        assert_eq!(
            args,
            vec![
                "--colors", "java", "--minwidth", "1", "--title", "CPU Flame Graph",
                "--countname", "samples", "in.txt",
            ]
        );
    }

    #[test]
    fn test_script_arguments_icicle() {
        let options = GraphOptions::icicle("CPU", Counter::Total);
        let args = FlamegraphScript::arguments(Path::new("in.txt"), &options);
        assert_eq!(&args[..2], &["--reverse", "--invert"]);
        assert!(args.windows(2).any(|w| w == ["--minwidth", "2"]));
        assert!(args.windows(2).any(|w| w == ["--countname", "units"]));
        assert!(args.windows(2).any(|w| w == ["--title", "CPU Icicle Graph"]));
    }

    #[test]
    fn test_missing_script_is_unavailable() {
        let script = FlamegraphScript::new("/no/such/dir/flamegraph.pl");
        assert!(!script.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn test_script_without_exec_bit_is_unavailable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("flamegraph.pl");
        std::fs::write(&path, "#!/usr/bin/env perl\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let script = FlamegraphScript::new(&path);
        assert!(!script.is_available());

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(script.is_available());
    }

    #[test]
    fn test_inferno_options() {
        let opts = InfernoRenderer::options(&GraphOptions::icicle("ALLOC", Counter::Samples));
        assert_eq!(opts.title, "ALLOC Icicle Graph");
        assert_eq!(opts.count_name, "samples");
        assert_eq!(opts.min_width, 2.0);
        assert!(opts.reverse_stack_order);
        assert!(matches!(opts.direction, Direction::Inverted));
    }

    #[test]
    fn test_inferno_renders_svg() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("stacks.txt");
        let output = temp_dir.path().join("flames.svg");
        std::fs::write(&input, "main;work 10\nmain;idle 5\n").unwrap();

        InfernoRenderer
            .render(&input, &output, &GraphOptions::flame("CPU", Counter::Samples))
            .unwrap();

        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("CPU Flame Graph"));
    }
}
