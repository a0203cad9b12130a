use std::sync::Arc;

use pricewatch_logging::scrape_debug;

use crate::extract::Extractor;
use crate::fetch::Fetcher;
use crate::{AppEntry, AppResult, ExtractionOutcome, FetchOutcome};

pub const REASON_NOT_FOUND: &str = "404";
pub const REASON_NO_STRUCTURED_DATA: &str = "no SoftwareApplication data";
pub const REASON_NO_PRICE: &str = "no price field";
pub const REASON_INVALID_FIELD: &str = "invalid field";

/// Classifies a single app: fetch, extract, bucket.
#[derive(Clone)]
pub struct AppFetcher {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
}

impl AppFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn Extractor>) -> Self {
        Self { fetcher, extractor }
    }

    pub async fn fetch_app(&self, entry: &AppEntry) -> AppResult {
        let page = match self.fetcher.get(&entry.url).await {
            FetchOutcome::Success(page) => page,
            FetchOutcome::NotFound => return AppResult::Failed(REASON_NOT_FOUND.to_string()),
            FetchOutcome::TransientFailure(err) => return AppResult::Failed(err.to_string()),
        };
        scrape_debug!(
            "{}: fetched {} bytes from {} in {} attempt(s)",
            entry.name,
            page.body.len(),
            page.final_url,
            page.attempts
        );

        classify(self.extractor.extract(&page.body))
    }
}

fn classify(outcome: ExtractionOutcome) -> AppResult {
    match outcome {
        ExtractionOutcome::Priced(offer) if !offer.amount.is_finite() || offer.amount < 0.0 => {
            AppResult::Failed(REASON_INVALID_FIELD.to_string())
        }
        ExtractionOutcome::Priced(offer) if offer.is_free() => AppResult::Free,
        ExtractionOutcome::Priced(offer) => AppResult::Paid(offer),
        ExtractionOutcome::NoStructuredData => {
            AppResult::Failed(REASON_NO_STRUCTURED_DATA.to_string())
        }
        ExtractionOutcome::NoPriceField => AppResult::Failed(REASON_NO_PRICE.to_string()),
        ExtractionOutcome::InvalidField => AppResult::Failed(REASON_INVALID_FIELD.to_string()),
    }
}
