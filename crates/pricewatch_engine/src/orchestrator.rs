use std::io;
use std::sync::Arc;
use std::time::Duration;

use pricewatch_logging::{scrape_info, scrape_warn};
use thiserror::Error;

use crate::app_fetcher::AppFetcher;
use crate::extract::JsonLdOfferExtractor;
use crate::fetch::{FetchSettings, ReqwestFetcher};
use crate::progress::ProgressSink;
use crate::retry::RetryPolicy;
use crate::{AppEntry, AppResult, FetchError, ScrapeEvent, ScrapeReport};

/// Everything a run needs to know, with production defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub retry: RetryPolicy,
    /// Pause between two consecutive apps.
    pub delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            retry: RetryPolicy::default(),
            delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to build http client: {0}")]
    ClientBuild(#[from] FetchError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// Runs a batch of apps one at a time and buckets the results.
///
/// Owns the HTTP session for the duration of the run; nothing is shared
/// with other orchestrators.
pub struct ScrapeOrchestrator {
    app_fetcher: AppFetcher,
    delay: Duration,
}

impl ScrapeOrchestrator {
    pub fn new(app_fetcher: AppFetcher, delay: Duration) -> Self {
        Self { app_fetcher, delay }
    }

    /// Wire the reqwest fetcher and the JSON-LD extractor.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        let fetcher = ReqwestFetcher::new(config.fetch, config.retry)?;
        let app_fetcher = AppFetcher::new(Arc::new(fetcher), Arc::new(JsonLdOfferExtractor));
        Ok(Self::new(app_fetcher, config.delay))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn run(&self, apps: &[AppEntry], sink: &dyn ProgressSink) -> ScrapeReport {
        let total = apps.len();
        let mut report = ScrapeReport::default();
        scrape_info!("Starting run over {} apps", total);
        sink.emit(ScrapeEvent::RunStarted { total });

        for (position, entry) in apps.iter().enumerate() {
            let index = position + 1;
            sink.emit(ScrapeEvent::AppStarted {
                index,
                total,
                name: entry.name.clone(),
            });

            let result = self.app_fetcher.fetch_app(entry).await;
            log_result(index, total, entry, &result);
            report.record(&entry.name, &result);
            sink.emit(ScrapeEvent::AppFinished {
                index,
                total,
                name: entry.name.clone(),
                result,
            });

            if index < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        scrape_info!(
            "Run finished: {} paid, {} free, {} failed",
            report.paid.len(),
            report.free.len(),
            report.failed.len()
        );
        report
    }

    /// Drive [`ScrapeOrchestrator::run`] to completion on the calling thread.
    ///
    /// Must not be called from inside an async runtime.
    pub fn run_blocking(
        &self,
        apps: &[AppEntry],
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeReport, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.run(apps, sink)))
    }
}

fn log_result(index: usize, total: usize, entry: &AppEntry, result: &AppResult) {
    match result {
        AppResult::Paid(offer) => scrape_info!("[{}/{}] {}: {}", index, total, entry.name, offer),
        AppResult::Free => scrape_info!("[{}/{}] {}: free", index, total, entry.name),
        AppResult::Failed(reason) => scrape_warn!(
            "[{}/{}] {} ({}) failed: {}",
            index,
            total,
            entry.name,
            entry.url,
            reason
        ),
    }
}
