pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{resolve_app_dirs, resolve_config, resolve_default_app_dirs};
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{wire_dependencies, AppRuntime, WiringError};
