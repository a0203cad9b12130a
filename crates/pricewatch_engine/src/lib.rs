//! Pricewatch engine: fetch product pages, extract listed prices, classify apps.
mod app_fetcher;
mod decode;
mod extract;
mod fetch;
mod orchestrator;
mod progress;
mod report;
mod retry;
mod types;

pub use app_fetcher::{
    AppFetcher, REASON_INVALID_FIELD, REASON_NOT_FOUND, REASON_NO_PRICE,
    REASON_NO_STRUCTURED_DATA,
};
pub use decode::{decode_html, DecodedHtml};
pub use extract::{Extractor, JsonLdOfferExtractor, SOFTWARE_APPLICATION_TYPE};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, BROWSER_USER_AGENT};
pub use orchestrator::{EngineConfig, EngineError, ScrapeOrchestrator};
pub use progress::{ChannelProgressSink, NullProgressSink, ProgressSink};
pub use report::{FailedApp, PaidApp, ScrapeReport};
pub use retry::{RetryPolicy, DEFAULT_RETRY_STATUSES};
pub use types::{
    AppEntry, AppResult, ExtractionOutcome, FailureKind, FetchError, FetchOutcome, FetchedPage,
    PriceOffer, ScrapeEvent,
};
