use tracing_subscriber::EnvFilter;

/// Initialize global tracing subscriber.
///
/// Log level can be configured via the `RUST_LOG` environment variable.
/// If unset, `info` is used by default. Errors writing to stdout go to
/// stderr, as is conventional for line-oriented CLI tools.
pub fn init() {
    init_with_default("info");
}

/// Same as [`init`], but with `verbose` forcing `debug` level regardless
/// of `RUST_LOG`. Used by CLI binaries wiring up `--verbose`.
pub fn init_verbose(verbose: bool) {
    init_with_default(if verbose { "debug" } else { "info" });
}

fn init_with_default(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore errors if the subscriber was already initialized (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
