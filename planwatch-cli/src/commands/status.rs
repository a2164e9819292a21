//! Status command - show current prices and history summary

use std::cmp::Ordering;

use chrono::Local;
use clap::Args;
use planwatch_core::{Config, Delta, Snapshot, SnapshotStore};

/// Show the latest snapshot and a history summary
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = SnapshotStore::new(config);

        println!("=== PRICE MONITOR STATUS ===\n");

        match store.load_latest() {
            Some(latest) => print_latest(&latest),
            None => println!("❌ No current price data found. Run the monitor first.\n"),
        }

        let history = store.load_history();
        if history.is_empty() {
            println!("❌ No price history found. Run the monitor first.\n");
        } else {
            print_history_summary(&history);
        }

        println!("🚀 To run monitoring: planwatch monitor");
        Ok(())
    }
}

fn print_latest(latest: &Snapshot) {
    let updated = latest
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    println!("📊 CURRENT PRICES (Last updated: {})", updated);
    println!("🌐 Source: {}", latest.source_url);
    println!("📱 Total plans found: {}\n", latest.total_plans);

    // Cheapest first
    let mut plans: Vec<_> = latest.plans.iter().collect();
    plans.sort_by(|a, b| {
        a.price_chf
            .partial_cmp(&b.price_chf)
            .unwrap_or(Ordering::Equal)
    });

    for plan in plans {
        println!("💰 {}", plan.name);
        println!("   Price: CHF {}", plan.price_chf);
        println!("   Data: {}", plan.data_allowance);
        println!("   Minutes: {}", plan.minutes);
        println!("   SMS: {}", plan.sms);
        println!("   EU Roaming: {}", plan.eu_roaming);
        println!("   EU Roaming Minutes: {}", plan.eu_roaming_minutes);
        println!();
    }

    if latest.price_changes.is_empty() {
        println!("✅ No price changes detected in last run\n");
    } else {
        println!("🔄 RECENT PRICE CHANGES:");
        for change in &latest.price_changes {
            match &change.change {
                Delta::New => {
                    println!("   ✨ NEW: {} - CHF {}", change.plan_name, change.new_price);
                }
                Delta::Amount(delta) => {
                    println!(
                        "   📈 CHANGE: {} - CHF {} → CHF {} ({:+.2})",
                        change.plan_name,
                        change.old_price.unwrap_or_default(),
                        change.new_price,
                        delta
                    );
                }
            }
        }
        println!();
    }
}

fn print_history_summary(history: &[Snapshot]) {
    println!("📈 PRICE HISTORY SUMMARY");
    println!("📅 Total monitoring days: {}", history.len());

    if let (Some(first), Some(last)) = (history.first(), history.last()) {
        println!("🗓️  First monitoring: {}", first.local_date());
        println!("🗓️  Last monitoring: {}", last.local_date());
    }

    if history.len() > 1 {
        println!("\n📋 All monitoring dates:");
        for entry in history {
            println!(
                "   {}: {} plans, {} changes",
                entry.local_date(),
                entry.total_plans,
                entry.price_changes.len()
            );
        }
    }
    println!();
}
