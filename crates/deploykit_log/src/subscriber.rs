//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back
/// to `fallback_level` (e.g. `"warn"`, `"deploykit_io_fs=debug"`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(fallback_level: &str, if_ansi: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(if_ansi)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::init_tracing;

    #[test]
    fn init_is_idempotent() {
        init_tracing("not a valid filter [", false);
        init_tracing("debug", false);
        tracing::debug!("subscriber installed");
    }
}
