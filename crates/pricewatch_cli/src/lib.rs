//! Command line front end: app list loading, console output and run wiring.
pub mod args;
pub mod config;
pub mod report;

pub use args::{Args, LogTarget};
pub use config::{load_apps, ConfigError, DEFAULT_CONFIG_PATH};
pub use report::{render_summary, ConsoleProgress};
