//! Notification message rendering
//!
//! Consumes the line-oriented change log written by a monitoring run
//! (`CHANGE:` / `NEW:` lines) and renders a Markdown summary, enriched with
//! feature details cross-referenced from the latest snapshot.
//!
//! Plan lookup here is a deliberate case-insensitive bidirectional substring
//! match, unlike the detector's exact-name keying: the renderer only
//! decorates output, where a loose match is helpful, while loose matching in
//! the detector could silently merge distinct plans.

use chrono::{DateTime, Local};

use crate::model::{Allowance, Plan, Snapshot};

/// Absolute percentage above which a change is flagged as significant
const SIGNIFICANT_PCT: f64 = 20.0;

const PLACEHOLDER_FEATURES: &str = "Mobile plan with data, calls & SMS";
const PLACEHOLDER_ROAMING: &str = "Included";

/// One `CHANGE:` line of the change log
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChange {
    pub plan_name: String,
    pub old_price: f64,
    pub new_price: f64,
}

/// One `NEW:` line of the change log
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNewPlan {
    pub plan_name: String,
    pub price: f64,
}

/// Parsed change log, split into price changes and new plans
#[derive(Debug, Default, PartialEq)]
pub struct ChangeLog {
    pub changes: Vec<ParsedChange>,
    pub new_plans: Vec<ParsedNewPlan>,
}

/// Parse the change log text. Lines that match neither format are ignored.
pub fn parse_change_log(text: &str) -> ChangeLog {
    let mut log = ChangeLog::default();

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("CHANGE:") {
            if let Some(change) = parse_change_line(rest.trim_start()) {
                log.changes.push(change);
            }
        } else if let Some(rest) = line.strip_prefix("NEW:") {
            if let Some(new_plan) = parse_new_line(rest.trim_start()) {
                log.new_plans.push(new_plan);
            }
        }
    }

    log
}

/// Parse `name - CHF old → CHF new (delta)`
fn parse_change_line(rest: &str) -> Option<ParsedChange> {
    let (name, price_part) = rest.split_once(" - CHF ")?;
    let (old_str, after_arrow) = price_part.split_once(" → CHF ")?;
    let (new_str, paren) = after_arrow.split_once(' ')?;
    paren.strip_prefix('(').and_then(|p| p.strip_suffix(')'))?;

    Some(ParsedChange {
        plan_name: name.trim().to_string(),
        old_price: old_str.trim().parse().ok()?,
        new_price: new_str.trim().parse().ok()?,
    })
}

/// Parse `name - CHF price`
fn parse_new_line(rest: &str) -> Option<ParsedNewPlan> {
    let (name, price_str) = rest.split_once(" - CHF ")?;
    Some(ParsedNewPlan {
        plan_name: name.trim().to_string(),
        price: price_str.trim().parse().ok()?,
    })
}

/// Find a plan whose name loosely matches, first match wins
fn find_plan<'a>(plan_name: &str, latest: Option<&'a Snapshot>) -> Option<&'a Plan> {
    let needle = plan_name.to_lowercase();
    latest?.plans.iter().find(|plan| {
        let hay = plan.name.to_lowercase();
        hay.contains(&needle) || needle.contains(&hay)
    })
}

/// Summarize a plan's feature set, e.g. `"Unlimited data, unlimited calls & SMS"`
fn format_plan_features(plan: &Plan) -> String {
    let mut features = Vec::new();

    match &plan.data_allowance {
        Allowance::Unlimited => features.push("Unlimited data".to_string()),
        Allowance::Value(v) => features.push(format!("{} data", v)),
        Allowance::Unknown => {}
    }

    if plan.minutes.is_unlimited() && plan.sms.is_unlimited() {
        features.push("unlimited calls & SMS".to_string());
    } else if plan.minutes.is_unlimited() {
        features.push("unlimited calls".to_string());
    } else if plan.sms.is_unlimited() {
        features.push("unlimited SMS".to_string());
    }

    if features.is_empty() {
        "Mobile plan".to_string()
    } else {
        features.join(", ")
    }
}

/// Summarize a plan's EU roaming terms
fn format_eu_roaming(plan: &Plan) -> String {
    if plan.eu_roaming.is_unknown() {
        return PLACEHOLDER_ROAMING.to_string();
    }

    let mut roaming = plan.eu_roaming.to_string();
    if !plan.eu_roaming_minutes.is_unknown() {
        roaming.push_str(&format!(" + {} min/SMS", plan.eu_roaming_minutes));
    }
    roaming
}

fn push_plan_details(message: &mut String, plan: Option<&Plan>) {
    match plan {
        Some(plan) => {
            message.push_str(&format!("• *Features:* {}\n", format_plan_features(plan)));
            message.push_str(&format!("• *EU Roaming:* {}\n", format_eu_roaming(plan)));
        }
        None => {
            message.push_str(&format!("• *Features:* {}\n", PLACEHOLDER_FEATURES));
            message.push_str(&format!("• *EU Roaming:* {}\n", PLACEHOLDER_ROAMING));
        }
    }
}

fn percentage(change: &ParsedChange) -> f64 {
    (change.new_price - change.old_price) / change.old_price * 100.0
}

/// Render the full notification message.
///
/// Sections are emitted in the order increases, decreases, new plans, each
/// omitted entirely when empty; within a section, entries keep the change
/// log's encounter order.
pub fn render_message(
    log_text: &str,
    latest: Option<&Snapshot>,
    base_url: &str,
    now: DateTime<Local>,
) -> String {
    let log = parse_change_log(log_text);

    let mut message = String::new();
    message.push_str("🚨 *Mobile Plan Price Alert* 🚨\n\n");
    message.push_str(&format!("📅 *{}*\n\n", now.format("%B %d, %Y at %H:%M")));
    message.push_str("---\n\n");

    let increases: Vec<&ParsedChange> = log
        .changes
        .iter()
        .filter(|c| c.new_price > c.old_price)
        .collect();
    let decreases: Vec<&ParsedChange> = log
        .changes
        .iter()
        .filter(|c| c.new_price < c.old_price)
        .collect();

    if !increases.is_empty() {
        message.push_str("### 📈 *Price Increases*\n\n");
        for change in increases {
            let pct = percentage(change);
            let warning = if pct.abs() > SIGNIFICANT_PCT {
                " ⚠️ *Significant increase*"
            } else {
                ""
            };

            message.push_str(&format!("🔴 *{}*\n", change.plan_name));
            message.push_str(&format!(
                "• *Price:* CHF {:.2} → *CHF {:.2}* (+CHF {:.2})\n",
                change.old_price,
                change.new_price,
                change.new_price - change.old_price
            ));
            message.push_str(&format!(
                "• *Increase:* {:+.2} ({:+.1}%){}\n",
                change.new_price - change.old_price,
                pct,
                warning
            ));
            push_plan_details(&mut message, find_plan(&change.plan_name, latest));
            message.push('\n');
        }
        message.push_str("---\n\n");
    }

    if !decreases.is_empty() {
        message.push_str("### 📉 *Price Decreases*\n\n");
        for change in decreases {
            let pct = percentage(change);
            let warning = if pct.abs() > SIGNIFICANT_PCT {
                " 🎉 *Significant decrease*"
            } else {
                ""
            };

            message.push_str(&format!("🟢 *{}*\n", change.plan_name));
            message.push_str(&format!(
                "• *Price:* CHF {:.2} → *CHF {:.2}* (-CHF {:.2})\n",
                change.old_price,
                change.new_price,
                (change.new_price - change.old_price).abs()
            ));
            message.push_str(&format!(
                "• *Decrease:* {:+.2} ({:+.1}%){}\n",
                change.new_price - change.old_price,
                pct,
                warning
            ));
            push_plan_details(&mut message, find_plan(&change.plan_name, latest));
            message.push('\n');
        }
        message.push_str("---\n\n");
    }

    if !log.new_plans.is_empty() {
        message.push_str("### ✨ *New Plans Available*\n\n");
        for new_plan in &log.new_plans {
            message.push_str(&format!("*🆕 {}*\n", new_plan.plan_name));
            message.push_str(&format!("• *Price:* CHF {:.2}\n", new_plan.price));
            push_plan_details(&mut message, find_plan(&new_plan.plan_name, latest));
            message.push('\n');
        }
        message.push_str("---\n\n");
    }

    message.push_str(&format!("🔗 [Compare All Plans]({})", base_url));
    message
}
