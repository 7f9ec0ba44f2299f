//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// HTTP plumbing that is noisy below `warn`.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

/// Base level for a `-v` count: 0 = info, 1 = debug, 2+ = trace.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let mut directives = String::from(level_for(verbosity));
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }
    EnvFilter::new(directives)
}

/// Install the global fmt subscriber. `RUST_LOG` overrides `verbosity`.
/// A second call is a no-op.
pub fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
