use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use pricewatch_engine::{EngineConfig, FetchSettings, RetryPolicy};
use pricewatch_logging::{LogDestination, DEFAULT_LOG_FILE};

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
    Off,
}

/// Check the listed price of every app in the configuration file.
#[derive(Debug, Parser)]
#[command(name = "pricewatch", version)]
pub struct Args {
    /// JSON file mapping app names to product page URLs.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Pause between two apps, in seconds.
    #[arg(long, default_value_t = 1.0, value_parser = parse_seconds)]
    pub delay_secs: f64,

    /// Attempts per page, including the first, for transient failures.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Per-request timeout, in seconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Where log records go.
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        let timeout = Duration::from_secs(self.timeout_secs);
        EngineConfig {
            fetch: FetchSettings {
                connect_timeout: timeout,
                request_timeout: timeout,
                ..FetchSettings::default()
            },
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                ..RetryPolicy::default()
            },
            delay: Duration::from_secs_f64(self.delay_secs),
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        let file = PathBuf::from(DEFAULT_LOG_FILE);
        match self.log {
            LogTarget::File => LogDestination::File(file),
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both(file),
            LogTarget::Off => LogDestination::Off,
        }
    }
}

fn parse_seconds(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number of seconds"))?;
    if value.is_finite() && (0.0..=86_400.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("`{raw}` must be between 0 and 86400"))
    }
}
