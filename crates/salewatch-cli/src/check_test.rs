use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::TimeZone;
use tempfile::TempDir;

use salewatch_detector::FetchError;

use super::*;

/// Serves canned pages keyed by URL. A status code entry fails the fetch;
/// the `PANIC` body makes the fetcher panic.
#[derive(Default)]
struct FakeFetcher {
    pages: Mutex<HashMap<String, Result<String, u16>>>,
}

impl FakeFetcher {
    fn serve(&self, url: &str, body: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.to_string()));
    }

    fn fail(&self, url: &str, status: u16) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(status));
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let entry = self.pages.lock().unwrap().get(url).cloned();
        match entry {
            Some(Ok(body)) if body == "PANIC" => panic!("parser exploded on {url}"),
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(FetchError::UnexpectedStatus {
                status,
                url: url.to_string(),
            }),
            None => Err(FetchError::NotFound {
                url: url.to_string(),
            }),
        }
    }
}

const ACME_URL: &str = "https://acme.example/sale";

fn t(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, day, 8, 0, 0).unwrap()
}

fn acme_catalog() -> StoresFile {
    StoresFile {
        stores: vec![StoreConfig::new("Acme Menswear", ACME_URL)],
    }
}

fn acme_listing_page(items: usize) -> String {
    let cards: String = (0..items)
        .map(|i| format!(r#"<div class="product-card" data-product-id="{i}"><span>Chinos {i}</span></div>"#))
        .collect();
    format!("<html><head><title>Acme Menswear</title></head><body><main>{cards}</main></body></html>")
}

fn options() -> RunOptions {
    RunOptions {
        verbose: true,
        dry_run: true,
        max_concurrent: 1,
    }
}

#[tokio::test]
async fn acme_menswear_lifecycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sale_state.json");
    let fetcher = FakeFetcher::default();
    let catalog = acme_catalog();

    // Run 1: twelve listings, no keywords → new sale.
    fetcher.serve(ACME_URL, &acme_listing_page(12));
    let mut state = SaleStateStore::load(&path).unwrap();
    let report = run_check(&fetcher, &catalog, &mut state, &[], &options(), t(1)).await;
    assert_eq!(report.new_sales.len(), 1);
    assert_eq!(report.new_sales[0].store_name, "Acme Menswear");
    assert_eq!(report.new_sales[0].description, "Sale active");
    let record = state.get("Acme Menswear").unwrap();
    assert!(record.active);
    assert_eq!(record.item_count, Some(12));
    assert_eq!(record.first_seen, Some(t(1)));
    assert_eq!(record.last_seen, Some(t(1)));
    state.save_at(t(1)).unwrap();

    // Run 2: same page → ongoing, no event, last_seen advances.
    let mut state = SaleStateStore::load(&path).unwrap();
    let report = run_check(&fetcher, &catalog, &mut state, &[], &options(), t(2)).await;
    assert!(report.new_sales.is_empty());
    assert_eq!(report.observations[0].1, Observation::Ongoing);
    let record = state.get("Acme Menswear").unwrap();
    assert_eq!(record.first_seen, Some(t(1)));
    assert_eq!(record.last_seen, Some(t(2)));
    state.save_at(t(2)).unwrap();

    // Run 3: listings gone → sale ended.
    fetcher.serve(ACME_URL, &acme_listing_page(0));
    let mut state = SaleStateStore::load(&path).unwrap();
    let report = run_check(&fetcher, &catalog, &mut state, &[], &options(), t(3)).await;
    assert_eq!(report.observations[0].1, Observation::Ended);
    let record = state.get("Acme Menswear").unwrap();
    assert!(!record.active);
    assert_eq!(record.ended, Some(t(3)));
}

#[tokio::test]
async fn fetch_failure_keeps_sale_active() {
    let dir = TempDir::new().unwrap();
    let fetcher = FakeFetcher::default();
    let catalog = acme_catalog();
    let mut state = SaleStateStore::empty(dir.path().join("state.json"));

    fetcher.serve(ACME_URL, &acme_listing_page(12));
    run_check(&fetcher, &catalog, &mut state, &[], &options(), t(1)).await;

    fetcher.fail(ACME_URL, 503);
    let report = run_check(&fetcher, &catalog, &mut state, &[], &options(), t(2)).await;
    assert_eq!(report.observations[0].1, Observation::Unknown);
    let record = state.get("Acme Menswear").unwrap();
    assert!(record.active);
    assert!(record.ended.is_none());

    fetcher.serve(ACME_URL, &acme_listing_page(12));
    let report = run_check(&fetcher, &catalog, &mut state, &[], &options(), t(3)).await;
    assert!(report.new_sales.is_empty(), "recovery must not re-notify");
}

#[tokio::test]
async fn verdicts_keep_catalog_order_under_concurrency() {
    let fetcher = FakeFetcher::default();
    let stores: Vec<StoreConfig> = (0..8)
        .map(|i| {
            let url = format!("https://store{i}.example/rea");
            fetcher.serve(&url, "<h1>REA</h1>");
            StoreConfig::new(&format!("Store {i}"), &url)
        })
        .collect();
    let refs: Vec<&StoreConfig> = stores.iter().collect();

    let verdicts = check_stores(&fetcher, &refs, 4).await;
    let names: Vec<&str> = verdicts.iter().map(|v| v.store_name.as_str()).collect();
    assert_eq!(
        names,
        (0..8).map(|i| format!("Store {i}")).collect::<Vec<_>>()
    );
    assert!(verdicts.iter().all(|v| v.is_active));
}

#[tokio::test]
async fn panicking_store_degrades_to_unknown() {
    let fetcher = FakeFetcher::default();
    fetcher.serve("https://boom.example/", "PANIC");
    fetcher.serve("https://fine.example/rea", "<h1>Mellanrea</h1>");
    let boom = StoreConfig::new("Boom", "https://boom.example/");
    let fine = StoreConfig::new("Fine", "https://fine.example/rea");

    let verdicts = check_stores(&fetcher, &[&boom, &fine], 1).await;
    assert!(verdicts[0].is_unknown());
    assert!(verdicts[0]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("parser exploded")));
    assert!(verdicts[1].is_active);
}

#[tokio::test]
async fn disabled_stores_are_not_checked() {
    let fetcher = FakeFetcher::default();
    fetcher.serve(ACME_URL, &acme_listing_page(12));
    let mut off = StoreConfig::new("Closed", "https://closed.example");
    off.enabled = false;
    let catalog = StoresFile {
        stores: vec![StoreConfig::new("Acme Menswear", ACME_URL), off],
    };
    let mut state = SaleStateStore::empty("unused.json");

    let report = run_check(&fetcher, &catalog, &mut state, &[], &options(), t(1)).await;
    assert_eq!(report.observations.len(), 1);
    assert!(state.get("Closed").is_none());
}

#[tokio::test]
async fn live_run_dispatches_new_sales() {
    let fetcher = FakeFetcher::default();
    fetcher.serve(ACME_URL, &acme_listing_page(12));
    let mut state = SaleStateStore::empty("unused.json");
    let channels = vec![Channel::unconfigured("email"), Channel::unconfigured("ntfy")];
    let options = RunOptions {
        dry_run: false,
        ..options()
    };

    let report = run_check(&fetcher, &acme_catalog(), &mut state, &channels, &options, t(1)).await;
    assert_eq!(report.notifications.len(), 2);
    assert!(report
        .notifications
        .iter()
        .all(|r| r.outcome == ChannelOutcome::Skipped));
}

#[test]
fn progress_labels() {
    let ok = SaleVerdict::failed("X", "https://x.example", "boom");
    assert_eq!(progress_label(&Observation::Ongoing, &ok), "📌 sale ongoing");
    assert_eq!(progress_label(&Observation::Ended, &ok), "❌ sale ended");
    assert_eq!(progress_label(&Observation::NoSale, &ok), "⬜ no sale");
    assert_eq!(
        progress_label(&Observation::Unknown, &ok),
        "⚠️  unknown (error: boom)"
    );
    let event = SaleEvent {
        store_name: "X".to_string(),
        description: "Up to 30% off".to_string(),
        url: "https://x.example".to_string(),
    };
    assert_eq!(
        progress_label(&Observation::NewSale(event), &ok),
        "✅ NEW SALE! Up to 30% off"
    );
}

#[test]
fn summary_lists_new_and_active_sales() {
    let mut state = SaleStateStore::empty("unused.json");
    let mut verdict = SaleVerdict::failed("Grandpa", "https://www.grandpa.se/sale", "x");
    verdict.error = None;
    verdict.is_active = true;
    verdict.description = "Up to 40% off".to_string();
    state.record_at("Grandpa", &verdict, t(1));

    let summary = format_summary(&[verdict.to_event()], &state);
    assert!(summary.contains("New sales found: 1"));
    assert!(summary.contains("Total active sales: 1"));
    assert!(summary.contains("• Grandpa: Up to 40% off\n        https://www.grandpa.se/sale"));
    assert!(summary.contains("📌 ALL ACTIVE SALES:"));
}

#[test]
fn summary_without_sales_omits_sections() {
    let state = SaleStateStore::empty("unused.json");
    let summary = format_summary(&[], &state);
    assert!(summary.contains("New sales found: 0"));
    assert!(!summary.contains("NEW SALES:"));
    assert!(!summary.contains("ALL ACTIVE SALES:"));
}
