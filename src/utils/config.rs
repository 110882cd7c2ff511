//! Configuration defaults and constants.

/// Current session report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Name reported by the session controller
pub const PROFILER_NAME: &str = "async profiler";

// Defaults mirror what async-profiler itself uses for a CPU session
pub const DEFAULT_EVENT: &str = "cpu";
pub const DEFAULT_INTERVAL: u64 = 10_000_000;
pub const DEFAULT_STACK_DEPTH: u32 = 2048;
pub const DEFAULT_FRAME_BUFFER: u64 = 10_000_000;

/// Control script inside the async-profiler installation
pub const CONTROL_SCRIPT: &str = "profiler.sh";

/// Default external flamegraph renderer
pub const DEFAULT_FLAMEGRAPH_SCRIPT: &str = "flamegraph.pl";

/// Frame separator in the collapsed-stack format
pub const FRAME_DELIMITER: &str = ";";

/// Frame substrings identifying GC workers and VM-internal threads
pub const SYSTEM_THREAD_MARKERS: &[&str] = &["GCTaskThread", "JavaThread"];

/// Frame substrings identifying build operation plumbing
pub const BUILD_OPERATION_MARKERS: &[&str] = &["BuildOperation"];

/// Frame substrings identifying dynamic dispatch machinery
pub const DYNAMIC_INVOCATION_MARKERS: &[&str] = &[
    "DynamicObject",
    "Closure.call",
    "MetaClass",
    "MetaMethod",
    "CallSite",
    "ConfigureDelegate",
    "Method.invoke",
    "MethodAccessor",
    "Proxy",
    "ConfigureUtil",
    "Script.invoke",
    "ClosureBackedAction",
    "getProperty(",
    "setProperty(",
];
