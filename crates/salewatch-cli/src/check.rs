//! The full check run: fetch every enabled store, apply verdicts to state,
//! notify about new sales, and print a summary.
//!
//! Fetching may run concurrently; verdicts come back in catalog order and
//! are applied to state one at a time. A store that fails (or panics) only
//! yields an "unknown" verdict for itself.

use std::fmt::Write as _;
use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use futures::FutureExt;

use salewatch_core::{SaleEvent, SaleVerdict, StoreConfig, StoresFile};
use salewatch_detector::{check_store, check_url, PageFetcher};
use salewatch_notify::{dispatch, Channel, ChannelOutcome, ChannelReport};
use salewatch_state::{Observation, SaleStateStore};

#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub verbose: bool,
    pub dry_run: bool,
    pub max_concurrent: usize,
}

/// What one run produced, for callers that want more than the printed output.
#[derive(Debug)]
pub(crate) struct RunReport {
    pub new_sales: Vec<SaleEvent>,
    pub observations: Vec<(String, Observation)>,
    pub notifications: Vec<ChannelReport>,
}

pub(crate) async fn run_check<F>(
    fetcher: &F,
    catalog: &StoresFile,
    state: &mut SaleStateStore,
    channels: &[Channel],
    options: &RunOptions,
    now: DateTime<Utc>,
) -> RunReport
where
    F: PageFetcher + ?Sized,
{
    let stores: Vec<&StoreConfig> = catalog.enabled().collect();
    println!("\n🔍 Checking {} stores for sales...", stores.len());
    println!(
        "   Time: {}\n",
        now.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
    );

    let verdicts = check_stores(fetcher, &stores, options.max_concurrent).await;

    let mut new_sales = Vec::new();
    let mut observations = Vec::with_capacity(verdicts.len());
    for verdict in &verdicts {
        let observation = state.observe_at(verdict, now);
        if options.verbose {
            println!("   {}: {}", verdict.store_name, progress_label(&observation, verdict));
        }
        if let Observation::NewSale(event) = &observation {
            new_sales.push(event.clone());
        }
        observations.push((verdict.store_name.clone(), observation));
    }

    let notifications = if options.dry_run {
        println!("\n🧪 Dry run: not sending notifications.");
        Vec::new()
    } else {
        send_notifications(channels, &new_sales).await
    };

    println!("{}", format_summary(&new_sales, state));

    RunReport {
        new_sales,
        observations,
        notifications,
    }
}

/// Fetches and analyses `stores` with at most `max_concurrent` in flight.
/// Results are returned in the same order as `stores`.
pub(crate) async fn check_stores<F>(
    fetcher: &F,
    stores: &[&StoreConfig],
    max_concurrent: usize,
) -> Vec<SaleVerdict>
where
    F: PageFetcher + ?Sized,
{
    stream::iter(stores.iter().copied())
        .map(|store| guarded_check(fetcher, store))
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}

async fn guarded_check<F>(fetcher: &F, store: &StoreConfig) -> SaleVerdict
where
    F: PageFetcher + ?Sized,
{
    match AssertUnwindSafe(check_store(fetcher, store))
        .catch_unwind()
        .await
    {
        Ok(verdict) => verdict,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(store = %store.name, reason = %reason, "store check panicked");
            SaleVerdict::failed(&store.name, &check_url(store), format!("check panicked: {reason}"))
        }
    }
}

pub(crate) fn progress_label(observation: &Observation, verdict: &SaleVerdict) -> String {
    match observation {
        Observation::NewSale(event) => format!("✅ NEW SALE! {}", event.description),
        Observation::Ongoing => "📌 sale ongoing".to_string(),
        Observation::Ended => "❌ sale ended".to_string(),
        Observation::Unknown => format!(
            "⚠️  unknown (error: {})",
            verdict.error.as_deref().unwrap_or("unknown")
        ),
        Observation::NoSale => "⬜ no sale".to_string(),
    }
}

async fn send_notifications(channels: &[Channel], new_sales: &[SaleEvent]) -> Vec<ChannelReport> {
    if new_sales.is_empty() {
        println!("\n📭 No new sales to notify about.");
        return Vec::new();
    }

    println!(
        "\n📬 Sending notifications for {} new sale(s)...",
        new_sales.len()
    );
    let reports = dispatch(channels, new_sales).await;
    print_channel_reports(&reports);
    reports
}

pub(crate) fn print_channel_reports(reports: &[ChannelReport]) {
    for report in reports {
        match &report.outcome {
            ChannelOutcome::Sent => println!("   ✅ {} sent", report.channel),
            ChannelOutcome::Failed(e) => println!("   ❌ {} failed: {e}", report.channel),
            ChannelOutcome::Skipped => {
                println!("   ⏭️  {} not configured (skipping)", report.channel);
            }
        }
    }
}

pub(crate) fn format_summary(new_sales: &[SaleEvent], state: &SaleStateStore) -> String {
    let rule = "=".repeat(50);
    let active: Vec<_> = state.active_sales().collect();

    let mut out = String::new();
    let _ = writeln!(out, "\n{rule}\n📊 SUMMARY\n{rule}");
    let _ = writeln!(out, "\n   New sales found: {}", new_sales.len());
    let _ = writeln!(out, "   Total active sales: {}", active.len());

    if !new_sales.is_empty() {
        let _ = writeln!(out, "\n   🆕 NEW SALES:");
        for sale in new_sales {
            let _ = writeln!(out, "      • {}: {}", sale.store_name, sale.description);
            let _ = writeln!(out, "        {}", sale.url);
        }
    }

    if !active.is_empty() {
        let _ = writeln!(out, "\n   📌 ALL ACTIVE SALES:");
        for (name, record) in &active {
            let _ = writeln!(out, "      • {name}: {}", record.description);
        }
    }

    let _ = write!(out, "\n{rule}");
    out
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
