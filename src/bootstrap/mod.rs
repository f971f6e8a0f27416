//! Process bootstrap: configuration, logging, and dependency wiring.

pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, load_config_or_default, DEFAULT_CONFIG_FILE};
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{app_settings, build_app, build_app_deps};
