//! One-shot commands: `--list`, `--store NAME`, `--test-notify`.

use salewatch_core::{find_store, AppConfig, SaleVerdict, StoresFile};
use salewatch_detector::{check_store, check_url, PageFetcher};
use salewatch_notify::{channels_from_config, dispatch_test};

use crate::check::print_channel_reports;

pub(crate) fn list_stores(catalog: &StoresFile) {
    println!("{} stores in catalog:", catalog.stores.len());
    for store in &catalog.stores {
        let group = store.group.as_deref().unwrap_or("-");
        let disabled = if store.enabled { "" } else { " (disabled)" };
        println!("   • {:<28}{:<18}{}{disabled}", store.name, group, check_url(store));
    }
}

/// Checks one store and prints the verdict. State and notifications are
/// not touched.
///
/// # Errors
///
/// Returns an error (after listing the catalog) when `name` is unknown.
pub(crate) async fn check_single_store<F>(
    fetcher: &F,
    catalog: &StoresFile,
    name: &str,
) -> anyhow::Result<()>
where
    F: PageFetcher + ?Sized,
{
    let Some(store) = find_store(catalog, name) else {
        println!("❌ Unknown store: {name}");
        println!("\nAvailable stores:");
        for store in &catalog.stores {
            println!("   • {}", store.name);
        }
        anyhow::bail!("unknown store '{name}'");
    };

    println!("\n🔍 Checking {}...", store.name);
    let verdict = check_store(fetcher, store).await;
    println!("\n{}", format_verdict(&verdict));
    Ok(())
}

pub(crate) fn format_verdict(verdict: &SaleVerdict) -> String {
    let mut lines = vec![format!("Store:       {}", verdict.store_name)];
    if let Some(error) = &verdict.error {
        lines.push("Status:      unknown (fetch failed)".to_string());
        lines.push(format!("Error:       {error}"));
    } else if verdict.is_active {
        lines.push("Status:      SALE ACTIVE".to_string());
        lines.push(format!("Description: {}", verdict.description));
    } else {
        lines.push("Status:      no sale".to_string());
    }
    if let Some(count) = verdict.item_count {
        lines.push(format!("Listings:    {count}"));
    }
    if let Some(pct) = verdict.discount_percent {
        lines.push(format!("Discount:    up to {pct}%"));
    }
    lines.push(format!("URL:         {}", verdict.evidence_url));
    lines.join("\n")
}

/// Sends a synthetic alert through every configured channel. State is not
/// loaded or saved.
///
/// # Errors
///
/// Returns an error if a configured channel cannot be constructed.
pub(crate) async fn test_notify(config: &AppConfig) -> anyhow::Result<()> {
    println!("🔔 Sending test notifications...");
    let channels = channels_from_config(config)?;
    let reports = dispatch_test(&channels).await;
    print_channel_reports(&reports);
    println!("\n✅ Test complete!");
    Ok(())
}
