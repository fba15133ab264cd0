//! testmynb CLI entry point

/// Environment variable read for the log filter before `RUST_LOG`.
const LOG_ENV: &str = "TESTMYNB_LOG";

fn main() {
    // Initialize structured logging with env-based filter, defaulting to warn
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    testmynb::cli::run();
}
