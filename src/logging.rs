//! Diagnostic logging to stderr.
//!
//! User-facing output goes through `println!`; tracing events are for
//! troubleshooting (`--verbose` or `RUST_LOG=branchflow=debug`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither `--verbose` nor `RUST_LOG` is given.
pub const DEFAULT_LEVEL: &str = "warn";

fn filter_directive(verbose: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directive) if !directive.is_empty() => directive,
        _ if verbose => "branchflow=debug".to_string(),
        _ => DEFAULT_LEVEL.to_string(),
    }
}

/// Install the global subscriber. Safe to call once per process.
pub fn init(verbose: bool) {
    let directive = filter_directive(verbose, std::env::var("RUST_LOG").ok());
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(directive))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
