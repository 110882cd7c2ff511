use pretty_assertions::assert_eq;
use profiler_flames::stacks::{SanitizeStats, Sanitizer, Stack};
use profiler_flames::utils::error::FormatError;
use std::fs;

fn sanitize_str(sanitizer: &Sanitizer, input: &str) -> String {
    let mut out = Vec::new();
    sanitizer.sanitize_lines(input.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_system_thread_stack_is_dropped() {
    let sanitizer = Sanitizer::for_config(false);
    let output = sanitize_str(&sanitizer, "a;b;GCTaskThread 5\nx;y;z 10\n");
    assert_eq!(output, "x;y;z 10\n");
}

#[test]
fn test_system_thread_filter_is_idempotent() {
    let sanitizer = Sanitizer::for_config(false);
    let input = "a;b;GCTaskThread 5\nJavaThread::thread_main_inner;Run 3\nx;y;z 10\n";
    let once = sanitize_str(&sanitizer, input);
    let twice = sanitize_str(&sanitizer, &once);
    assert_eq!(once, twice);
}

#[test]
fn test_system_threads_kept_when_included() {
    let sanitizer = Sanitizer::for_config(true);
    let output = sanitize_str(&sanitizer, "a;b;GCTaskThread 5\nx;y;z 10\n");
    assert_eq!(output, "a;b;GCTaskThread 5\nx;y;z 10\n");
}

#[test]
fn test_filter_runs_before_renaming() {
    // CollapseInfrastructure would rewrite this frame to "dynamic invocation"
    let sanitizer = Sanitizer::for_config(false);
    let output = sanitize_str(&sanitizer, "JavaThreadProxy.invoke;work 4\n");
    assert_eq!(output, "");
}

#[test]
fn test_weights_and_order_preserved() {
    let sanitizer = Sanitizer::for_config(false);
    let input = "\
java/lang/Thread.run;org/gradle/Worker.execute 7
java/lang/Thread.run;org/gradle/DefaultBuildOperationRunner.run;org/gradle/Task.run 3
java/lang/Thread.run;build_8x7ejkgw2f2k3hbn9l1w.run 11
";
    let output = sanitize_str(&sanitizer, input);
    assert_eq!(
        output,
        "\
Thread.run;Worker.execute 7
Thread.run;build operations;Task.run 3
Thread.run;build script 11
"
    );
}

#[test]
fn test_sanitize_is_deterministic() {
    let sanitizer = Sanitizer::for_config(false);
    let input = "a.b.C.d;MetaClassImpl.invokeMethod;CallSiteArray.call 2\nq 1\n";
    assert_eq!(sanitize_str(&sanitizer, input), sanitize_str(&sanitizer, input));
}

#[test]
fn test_sanitize_stack_keeps_weight() {
    let sanitizer = Sanitizer::for_config(false);
    let stack = Stack::parse("java.util.concurrent.FutureTask.run;com.acme.Main.main 99", 1).unwrap();
    let cleaned = sanitizer.sanitize_stack(stack).unwrap();
    assert_eq!(cleaned.weight, 99);
    assert_eq!(cleaned.frames, vec!["FutureTask.run", "Main.main"]);
}

#[test]
fn test_sanitize_file_all_dropped_writes_empty_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("raw.txt");
    let output = temp_dir.path().join("clean.txt");
    fs::write(&input, "GCTaskThread::run 5\n").unwrap();

    let stats = Sanitizer::for_config(false).sanitize(&input, &output).unwrap();

    assert_eq!(stats, SanitizeStats { read: 1, kept: 0, dropped: 1 });
    assert!(output.is_file());
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn test_sanitize_empty_input() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("raw.txt");
    let output = temp_dir.path().join("nested/clean.txt");
    fs::write(&input, "").unwrap();

    let stats = Sanitizer::for_config(false).sanitize(&input, &output).unwrap();

    assert_eq!(stats, SanitizeStats::default());
    assert!(output.is_file());
}

#[test]
fn test_malformed_line_leaves_no_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("raw.txt");
    let output = temp_dir.path().join("clean.txt");
    fs::write(&input, "x;y;z 10\na;b;c\n").unwrap();

    let err = Sanitizer::for_config(false).sanitize(&input, &output).unwrap_err();

    assert!(matches!(err, FormatError::Malformed { line: 2, .. }));
    assert!(!output.exists());
    // Only the input file remains; the staging file was cleaned up
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[test]
fn test_malformed_line_keeps_previous_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("raw.txt");
    let output = temp_dir.path().join("clean.txt");
    fs::write(&input, "a;b;c\n").unwrap();
    fs::write(&output, "previous 1\n").unwrap();

    assert!(Sanitizer::for_config(false).sanitize(&input, &output).is_err());
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous 1\n");
}

#[test]
fn test_missing_input_is_io_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let err = Sanitizer::for_config(false)
        .sanitize(&temp_dir.path().join("nope.txt"), &temp_dir.path().join("out.txt"))
        .unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
}

#[cfg(unix)]
#[test]
fn test_sanitized_output_uses_default_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("raw.txt");
    let output = temp_dir.path().join("clean.txt");
    // Plain File::create in the same directory gives the expected mode under the current umask
    fs::write(&input, "x;y;z 10\n").unwrap();

    Sanitizer::for_config(false).sanitize(&input, &output).unwrap();

    let mode = |path: &std::path::Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&output), mode(&input));
}
