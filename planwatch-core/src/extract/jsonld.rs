//! Structured-metadata extraction
//!
//! The tariff page embeds schema.org product listings as
//! `<script type="application/ld+json">` blocks, either as a single object,
//! an array, or wrapped in an `@graph` collection. This is the preferred
//! extraction source; the free-text fallback only runs when it yields
//! nothing.

use chrono::{DateTime, Utc};
use scraper::Html;
use serde_json::Value;

use super::{scan, selector};
use crate::model::{Allowance, Plan};

/// Extract plans from all JSON-LD product listings in the document.
/// Malformed scripts and entries are skipped; duplicates by name are
/// suppressed, first occurrence wins.
pub(super) fn extract_jsonld(document: &Html, now: DateTime<Utc>) -> Vec<Plan> {
    let mut plans: Vec<Plan> = Vec::new();

    let Some(script_sel) = selector(r#"script[type="application/ld+json"]"#) else {
        return plans;
    };

    for script in document.select(&script_sel) {
        let raw = script.text().collect::<String>();
        let json: Value = match serde_json::from_str(&raw) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };

        for product in product_entries(&json) {
            let Some(plan) = plan_from_product(product, now) else {
                continue;
            };
            if plans.iter().any(|p| p.name == plan.name) {
                continue;
            }
            plans.push(plan);
        }
    }

    plans
}

/// Unwrap the possible JSON-LD shapes into a flat list of candidate entries
fn product_entries(json: &Value) -> Vec<&Value> {
    if let Some(graph) = json.get("@graph").and_then(Value::as_array) {
        graph.iter().collect()
    } else if let Some(list) = json.as_array() {
        list.iter().collect()
    } else if json.get("@type").and_then(Value::as_str) == Some("Product") {
        vec![json]
    } else {
        Vec::new()
    }
}

fn plan_from_product(product: &Value, now: DateTime<Utc>) -> Option<Plan> {
    if product.get("@type").and_then(Value::as_str) != Some("Product") {
        return None;
    }

    let name = product
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown Plan");
    let description = product
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("");

    // Listings without a numeric offer price are not plans we can track
    let price = offer_price(product.get("offers")?)?;

    let fields = parse_description(description);

    Some(Plan {
        name: name.to_string(),
        price_chf: price,
        data_allowance: fields.data_allowance,
        minutes: fields.minutes,
        sms: fields.sms,
        eu_roaming: fields.eu_roaming,
        eu_roaming_minutes: fields.eu_roaming_minutes,
        description: description.to_string(),
        scraped_at: now,
    })
}

/// `offers.price` arrives as a JSON number or a numeric string
fn offer_price(offers: &Value) -> Option<f64> {
    match offers.get("price")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Attribute fields pulled out of a plan description
#[derive(Debug, Default, PartialEq)]
pub(super) struct DescriptionFields {
    pub data_allowance: Allowance,
    pub minutes: Allowance,
    pub sms: Allowance,
    pub eu_roaming: Allowance,
    pub eu_roaming_minutes: Allowance,
}

/// Parse a description like
/// `"unlimitierte GB | unlimitierte Minuten | 5 GB EU Roaming + 100 Minuten"`.
/// Every rule is independently optional and defaults to `Unknown`.
pub(super) fn parse_description(description: &str) -> DescriptionFields {
    let mut fields = DescriptionFields::default();
    if description.is_empty() {
        return fields;
    }

    if description.contains("unlimitierte GB") {
        fields.data_allowance = Allowance::Unlimited;
    } else if let Some(n) = scan::int_before(description, "GB") {
        fields.data_allowance = Allowance::Value(format!("{}GB", n));
    }

    if description.contains("unlimitierte Minuten") {
        fields.minutes = Allowance::Unlimited;
    } else if let Some(n) = scan::int_before(description, "Minuten") {
        fields.minutes = Allowance::Value(n.to_string());
    }

    if description.contains("unlimitierte") && description.contains("SMS") {
        fields.sms = Allowance::Unlimited;
    } else if let Some(n) = scan::int_before(description, "SMS") {
        fields.sms = Allowance::Value(n.to_string());
    }

    // Roaming terms live in their own |-delimited segment; numbers elsewhere
    // in the description must not bleed into the roaming fields.
    if let Some(segment) = description
        .split('|')
        .map(str::trim)
        .find(|part| part.contains("EU Roaming"))
    {
        if let Some(n) = scan::decimal_before(segment, "GB") {
            fields.eu_roaming = Allowance::Value(format!("{}GB", n));
        }
        if let Some(n) = scan::grouped_number_before(segment, "Minuten") {
            fields.eu_roaming_minutes = Allowance::Value(n.to_string());
        }
    }

    fields
}
