use crate::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidApp {
    pub name: String,
    /// Formatted as `"<amount> <currency>"`.
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedApp {
    pub name: String,
    pub reason: String,
}

/// Three-way partition of a run. Each bucket keeps input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub paid: Vec<PaidApp>,
    pub free: Vec<String>,
    pub failed: Vec<FailedApp>,
}

impl ScrapeReport {
    pub(crate) fn record(&mut self, name: &str, result: &AppResult) {
        match result {
            AppResult::Paid(offer) => self.paid.push(PaidApp {
                name: name.to_string(),
                price: offer.to_string(),
            }),
            AppResult::Free => self.free.push(name.to_string()),
            AppResult::Failed(reason) => self.failed.push(FailedApp {
                name: name.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.paid.len() + self.free.len() + self.failed.len()
    }

    pub fn paid_price(&self, name: &str) -> Option<&str> {
        self.paid
            .iter()
            .find(|app| app.name == name)
            .map(|app| app.price.as_str())
    }

    pub fn failed_names(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(|app| app.name.as_str())
    }
}
