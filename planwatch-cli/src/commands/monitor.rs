//! Monitor command - one fetch, extract, diff and persist cycle

use chrono::{Local, Utc};
use clap::Args;
use planwatch_core::{detect_changes, extract_plans, Config, Delta, Snapshot, SnapshotStore};

use crate::fetch;

/// Run one monitoring pass against the configured tariff page
#[derive(Args, Debug)]
pub struct MonitorArgs {}

impl MonitorArgs {
    /// Execute the monitor command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        println!("Starting price monitoring at {}", Local::now());

        let store = SnapshotStore::new(config);
        let now = Utc::now();

        let mut snapshot = match fetch::fetch_page(&config.monitor).await {
            Ok(html) => {
                let plans = extract_plans(&html, now);
                Snapshot::new(&config.monitor.base_url, plans, now)
            }
            Err(e) => {
                tracing::error!(error = %e, "page fetch failed");
                Snapshot::failed(&config.monitor.base_url, e.to_string(), now)
            }
        };

        if let Some(error) = &snapshot.error {
            println!("Error occurred during scraping: {}", error);
            // The failed run still becomes the "current" snapshot, but is
            // kept out of the daily history so it never serves as a diff
            // baseline.
            store.save_latest(&snapshot)?;
            return Ok(());
        }

        println!("Found {} plans", snapshot.total_plans);

        let mut history = store.load_history();
        let changes = detect_changes(&snapshot, &history);

        if changes.is_empty() {
            println!("No price changes detected");
        } else {
            println!("Price changes detected:");
            for change in &changes {
                match &change.change {
                    Delta::New => {
                        println!("  NEW: {} - CHF {}", change.plan_name, change.new_price);
                    }
                    Delta::Amount(delta) => {
                        println!(
                            "  CHANGE: {} - CHF {} → CHF {} ({:+.2})",
                            change.plan_name,
                            change.old_price.unwrap_or_default(),
                            change.new_price,
                            delta
                        );
                    }
                }
            }
        }

        snapshot.price_changes = changes;
        SnapshotStore::upsert_today(&mut history, snapshot.clone());

        store.save_history(&history)?;
        store.save_latest(&snapshot)?;

        println!("Monitoring completed successfully");
        Ok(())
    }
}
