//! Tracing setup for embedders.

use tracing_subscriber::EnvFilter;

/// Installs a global tracing subscriber reading its filter from
/// `RUST_LOG`, defaulting to `info` for this crate.
///
/// Safe to call more than once; subsequent calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("storyreel=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
