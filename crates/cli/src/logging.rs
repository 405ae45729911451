use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG`. Defaults to warnings only so the
/// tables on stdout stay readable.
pub(crate) fn init_logging(verbose: bool) {
    let fallback = if verbose { "coinfolio_core=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
