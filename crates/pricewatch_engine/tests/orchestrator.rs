use std::collections::{HashMap, HashSet};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use pricewatch_engine::{
    AppEntry, AppFetcher, AppResult, ChannelProgressSink, FailedApp, FailureKind, FetchError,
    FetchOutcome, FetchedPage, Fetcher, JsonLdOfferExtractor, NullProgressSink, PaidApp,
    ScrapeEvent, ScrapeOrchestrator, ScrapeReport, REASON_NOT_FOUND, REASON_NO_STRUCTURED_DATA,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Deterministic transport: fixed outcome per URL, records every call.
#[derive(Default)]
struct StubFetcher {
    outcomes: HashMap<String, FetchOutcome>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn page(mut self, url: &str, body: &str) -> Self {
        self.outcomes.insert(
            url.to_string(),
            FetchOutcome::Success(FetchedPage {
                body: body.to_string(),
                final_url: url.to_string(),
                status: 200,
                attempts: 1,
                encoding_label: "UTF-8".to_string(),
            }),
        );
        self
    }

    fn outcome(mut self, url: &str, outcome: FetchOutcome) -> Self {
        self.outcomes.insert(url.to_string(), outcome);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn get(&self, url: &str) -> FetchOutcome {
        self.calls.lock().unwrap().push(url.to_string());
        self.outcomes
            .get(url)
            .cloned()
            .unwrap_or(FetchOutcome::NotFound)
    }
}

fn priced(price: &str, currency: &str) -> String {
    format!(
        r#"<script type="application/ld+json">{{"@type":"SoftwareApplication","offers":{{"price":"{price}","priceCurrency":"{currency}"}}}}</script>"#
    )
}

fn stub_transport() -> StubFetcher {
    StubFetcher::default()
        .page("https://apps.test/a", &priced("4.99", "USD"))
        .page("https://apps.test/b", &priced("0", "USD"))
        .page("https://apps.test/c", "<html><body>nothing here</body></html>")
        .page("https://apps.test/d", &priced("12", "EUR"))
        .outcome(
            "https://apps.test/e",
            FetchOutcome::TransientFailure(FetchError {
                kind: FailureKind::HttpStatus(503),
                message: "Service Unavailable".to_string(),
                attempts: 3,
            }),
        )
        .page("https://apps.test/f", &priced("free", "USD"))
}

fn apps() -> Vec<AppEntry> {
    ["a", "b", "c", "d", "e", "f", "g"]
        .iter()
        .map(|id| AppEntry::new(format!("App {id}"), format!("https://apps.test/{id}")))
        .collect()
}

fn orchestrator(fetcher: Arc<StubFetcher>, delay: Duration) -> ScrapeOrchestrator {
    let app_fetcher = AppFetcher::new(fetcher, Arc::new(JsonLdOfferExtractor));
    ScrapeOrchestrator::new(app_fetcher, delay)
}

fn all_names(report: &ScrapeReport) -> Vec<String> {
    report
        .paid
        .iter()
        .map(|app| app.name.clone())
        .chain(report.free.iter().cloned())
        .chain(report.failed_names().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn every_app_lands_in_exactly_one_bucket() {
    let fetcher = Arc::new(stub_transport());
    let report = orchestrator(fetcher.clone(), Duration::ZERO)
        .run(&apps(), &NullProgressSink)
        .await;

    let names = all_names(&report);
    let unique: HashSet<_> = names.iter().cloned().collect();
    let expected: HashSet<_> = apps().into_iter().map(|app| app.name).collect();
    assert_eq!(names.len(), apps().len());
    assert_eq!(unique, expected);
    assert_eq!(report.total(), apps().len());
    assert_eq!(fetcher.calls().len(), apps().len());
}

#[tokio::test]
async fn buckets_keep_input_order_and_content() {
    let fetcher = Arc::new(stub_transport());
    let report = orchestrator(fetcher, Duration::ZERO)
        .run(&apps(), &NullProgressSink)
        .await;

    assert_eq!(
        report.paid,
        vec![
            PaidApp {
                name: "App a".to_string(),
                price: "4.99 USD".to_string(),
            },
            PaidApp {
                name: "App d".to_string(),
                price: "12.0 EUR".to_string(),
            },
        ]
    );
    assert_eq!(report.free, vec!["App b".to_string(), "App f".to_string()]);
    assert_eq!(
        report.failed,
        vec![
            FailedApp {
                name: "App c".to_string(),
                reason: REASON_NO_STRUCTURED_DATA.to_string(),
            },
            FailedApp {
                name: "App e".to_string(),
                reason: "http status 503 (Service Unavailable) after 3 attempts".to_string(),
            },
            FailedApp {
                name: "App g".to_string(),
                reason: REASON_NOT_FOUND.to_string(),
            },
        ]
    );
    assert_eq!(report.paid_price("App a"), Some("4.99 USD"));
    assert_eq!(report.paid_price("App b"), None);
}

#[tokio::test]
async fn apps_are_fetched_once_each_in_input_order() {
    let fetcher = Arc::new(stub_transport());
    orchestrator(fetcher.clone(), Duration::ZERO)
        .run(&apps(), &NullProgressSink)
        .await;

    let expected: Vec<String> = apps().into_iter().map(|app| app.url).collect();
    assert_eq!(fetcher.calls(), expected);
}

#[tokio::test]
async fn same_input_gives_identical_reports() {
    let runner = orchestrator(Arc::new(stub_transport()), Duration::ZERO);
    let first = runner.run(&apps(), &NullProgressSink).await;
    let second = runner.run(&apps(), &NullProgressSink).await;
    assert_eq!(first, second);
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

#[tokio::test]
async fn empty_input_gives_empty_report() {
    let fetcher = Arc::new(stub_transport());
    let report = orchestrator(fetcher.clone(), Duration::from_secs(1))
        .run(&[], &NullProgressSink)
        .await;
    assert_eq!(report, ScrapeReport::default());
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn progress_is_reported_once_per_app() {
    let (tx, rx) = mpsc::channel();
    let sink = ChannelProgressSink::new(tx);
    let entries = &apps()[..2];
    orchestrator(Arc::new(stub_transport()), Duration::ZERO)
        .run(entries, &sink)
        .await;
    drop(sink);

    let events: Vec<ScrapeEvent> = rx.iter().collect();
    assert_eq!(
        events,
        vec![
            ScrapeEvent::RunStarted { total: 2 },
            ScrapeEvent::AppStarted {
                index: 1,
                total: 2,
                name: "App a".to_string(),
            },
            ScrapeEvent::AppFinished {
                index: 1,
                total: 2,
                name: "App a".to_string(),
                result: AppResult::Paid(pricewatch_engine::PriceOffer::new(4.99, "USD")),
            },
            ScrapeEvent::AppStarted {
                index: 2,
                total: 2,
                name: "App b".to_string(),
            },
            ScrapeEvent::AppFinished {
                index: 2,
                total: 2,
                name: "App b".to_string(),
                result: AppResult::Free,
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn delay_is_applied_between_apps_only() {
    let delay = Duration::from_secs(1);
    let runner = orchestrator(Arc::new(stub_transport()), delay);
    let entries = &apps()[..3];

    let started = tokio::time::Instant::now();
    runner.run(entries, &NullProgressSink).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= delay * 2, "{elapsed:?}");
    assert!(elapsed < delay * 3, "{elapsed:?}");
}

#[test]
fn run_blocking_drives_the_batch_on_the_calling_thread() {
    let fetcher = Arc::new(stub_transport());
    let report = orchestrator(fetcher.clone(), Duration::from_millis(1))
        .run_blocking(&apps()[..3], &NullProgressSink)
        .expect("runtime");
    assert_eq!(report.total(), 3);
    assert_eq!(fetcher.calls().len(), 3);
}

#[tokio::test]
async fn end_to_end_against_http_server() {
    pricewatch_logging::initialize_for_tests();
    let server = MockServer::start().await;
    let pages = [
        ("/paid", 200, priced("4.99", "USD")),
        ("/free", 200, priced("0", "USD")),
        ("/missing", 404, String::new()),
        ("/bare", 200, "<html><body>no data</body></html>".to_string()),
    ];
    for (route, status, body) in pages {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_raw(body, "text/html"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let apps: Vec<AppEntry> = ["paid", "free", "missing", "bare"]
        .iter()
        .map(|id| AppEntry::new(*id, format!("{}/{}", server.uri(), id)))
        .collect();
    let config = pricewatch_engine::EngineConfig {
        delay: Duration::ZERO,
        ..Default::default()
    };
    let report = ScrapeOrchestrator::from_config(config)
        .expect("orchestrator")
        .run(&apps, &NullProgressSink)
        .await;

    assert_eq!(report.paid_price("paid"), Some("4.99 USD"));
    assert_eq!(report.free, vec!["free".to_string()]);
    assert_eq!(
        report.failed_names().collect::<Vec<_>>(),
        vec!["missing", "bare"]
    );
}
