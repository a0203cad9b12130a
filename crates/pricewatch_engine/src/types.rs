use std::fmt;

/// One application to check: a report key plus the product page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub name: String,
    pub url: String,
}

impl AppEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Listed price of an application. `amount` is finite and never negative.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceOffer {
    pub amount: f64,
    pub currency: String,
}

impl PriceOffer {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn is_free(&self) -> bool {
        self.amount == 0.0
    }
}

/// Renders as `"<amount> <currency>"`, e.g. `4.99 USD` or `5.0 EUR`.
/// Whole amounts keep one decimal place; an empty currency is omitted.
impl fmt::Display for PriceOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.amount.fract() == 0.0 && self.amount.abs() < 1e15 {
            write!(f, "{:.1}", self.amount)?;
        } else {
            write!(f, "{}", self.amount)?;
        }
        if !self.currency.is_empty() {
            write!(f, " {}", self.currency)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: String,
    pub final_url: String,
    pub status: u16,
    pub attempts: u32,
    pub encoding_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(FetchedPage),
    /// HTTP 404. Never retried.
    NotFound,
    /// Network error, or an HTTP error that was not retryable or exhausted its retries.
    TransientFailure(FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
    pub attempts: u32,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            attempts: 1,
        }
    }

    pub(crate) fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " ({})", self.message)?;
        }
        if self.attempts > 1 {
            write!(f, " after {} attempts", self.attempts)?;
        }
        Ok(())
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Priced(PriceOffer),
    /// No `application/ld+json` block with `"@type": "SoftwareApplication"`.
    NoStructuredData,
    /// The block exists but `offers.price` is missing or null.
    NoPriceField,
    /// `offers` exists but is not an object.
    InvalidField,
}

/// Final classification of one app. Every app ends in exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum AppResult {
    Paid(PriceOffer),
    Free,
    Failed(String),
}

/// Progress notifications emitted by the orchestrator. `index` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeEvent {
    RunStarted {
        total: usize,
    },
    AppStarted {
        index: usize,
        total: usize,
        name: String,
    },
    AppFinished {
        index: usize,
        total: usize,
        name: String,
        result: AppResult,
    },
}
