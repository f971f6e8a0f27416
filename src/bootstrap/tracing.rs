//! Tracing subscriber initialization.
//!
//! Logs go to stderr so stdout stays free for the command summary.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives, used when `RUST_LOG` is unset.
///
/// Debug for the workspace crates in development builds, info otherwise.
/// HTTP client internals stay at warn.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let level = if is_dev { "debug" } else { "info" };
    vec![
        "info".to_string(),
        format!("batchpress={level}"),
        format!("bp_app={level}"),
        format!("bp_core={level}"),
        format!("bp_infra={level}"),
        "hyper=warn".to_string(),
        "reqwest=warn".to_string(),
    ]
}

/// Initialize the global tracing subscriber. Call once, before any work.
///
/// # Errors
///
/// Returns `Err` if a subscriber is already registered.
pub fn init_tracing_subscriber() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(build_filter_directives(is_development()).join(",")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_follow_build_profile() {
        let dev = build_filter_directives(true);
        assert!(dev.contains(&"bp_app=debug".to_string()));

        let prod = build_filter_directives(false);
        assert!(prod.contains(&"bp_app=info".to_string()));
        assert!(prod.contains(&"reqwest=warn".to_string()));
    }

    #[test]
    fn test_directives_parse_as_filter() {
        let joined = build_filter_directives(true).join(",");
        assert!(EnvFilter::try_new(joined).is_ok());
    }
}
