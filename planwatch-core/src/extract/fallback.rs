//! Free-text fallback extraction
//!
//! Only invoked when the structured-metadata strategy finds nothing, e.g.
//! after a page redesign drops the JSON-LD listings. Candidate containers
//! are picked by class-name keywords, or as a last resort by currency
//! markers in their text, and scanned with cruder single-pass patterns.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Node};

use super::{scan, selector};
use crate::model::{Allowance, Plan};

const CLASS_KEYWORDS: [&str; 4] = ["tariff", "plan", "price", "card"];
const UNLIMITED_WORDS: [&str; 2] = ["unlimited", "unlimitiert"];

/// Candidates beyond this are usually page furniture, not tariff cards
const MAX_CANDIDATES: usize = 10;

pub(super) fn extract_fallback(document: &Html, now: DateTime<Utc>) -> Vec<Plan> {
    let mut plans: Vec<Plan> = Vec::new();

    let Some(heading_sel) = selector("h1, h2, h3, h4, strong") else {
        return plans;
    };

    let mut candidates = keyword_candidates(document);
    if candidates.is_empty() {
        candidates = currency_candidates(document);
    }
    candidates.truncate(MAX_CANDIDATES);

    for candidate in candidates {
        let text: String = candidate.text().collect();

        // A candidate without a currency-prefixed price is not a plan card
        let Some(price) = scan::currency_amount(&text) else {
            continue;
        };

        let name = candidate
            .select(&heading_sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|t| t.chars().any(char::is_alphanumeric))
            .unwrap_or_else(|| "Unknown Plan".to_string());

        if plans
            .iter()
            .any(|p| p.name == name && p.price_chf == price)
        {
            continue;
        }

        let data_allowance = scan::decimal_before_any_ci(&text, &["GB", "TB"])
            .map(|n| Allowance::Value(format!("{}GB", n)))
            .unwrap_or_default();

        plans.push(Plan {
            name,
            price_chf: price,
            data_allowance,
            minutes: numeric_or_unlimited(&text, &["min"]),
            sms: numeric_or_unlimited(&text, &["SMS"]),
            eu_roaming: Allowance::Unknown,
            eu_roaming_minutes: Allowance::Unknown,
            description: text.trim().to_string(),
            scraped_at: now,
        });
    }

    plans
}

/// `div`/`section` elements whose class names look like tariff cards
fn keyword_candidates(document: &Html) -> Vec<ElementRef<'_>> {
    let Some(sel) = selector("div, section") else {
        return Vec::new();
    };
    document
        .select(&sel)
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|class| CLASS_KEYWORDS.iter().any(|k| scan::contains_ci(class, k)))
        })
        .collect()
}

/// Last resort: any element with a currency marker in its direct text
fn currency_candidates(document: &Html) -> Vec<ElementRef<'_>> {
    let Some(sel) = selector("*") else {
        return Vec::new();
    };
    document
        .select(&sel)
        .filter(|el| {
            el.children().any(|child| match child.value() {
                Node::Text(text) => {
                    scan::contains_ci(&text.text, "CHF") || scan::contains_ci(&text.text, "Fr.")
                }
                _ => false,
            })
        })
        .collect()
}

/// Single-pass numeric-or-unlimited scan used for minutes and SMS
fn numeric_or_unlimited(text: &str, units: &[&str]) -> Allowance {
    match scan::word_or_int_before_any_ci(text, &UNLIMITED_WORDS, units) {
        Some(v) if v.bytes().all(|b| b.is_ascii_digit()) => Allowance::Value(v.to_string()),
        Some(_) => Allowance::Unlimited,
        None => Allowance::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_class_keyword_containers() {
        let html = r#"
            <html><body>
              <div class="tariff-card">
                <h3>Spusu 50</h3>
                <p>50 GB Daten, 1000 Min, 500 SMS für CHF 19.90</p>
              </div>
              <div class="tariff-card">
                <h3>Spusu Unlimited</h3>
                <p>Unlimited GB, unlimitiert Minuten für CHF 34.90</p>
              </div>
              <div class="footer">CHF prices include VAT</div>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let plans = extract_fallback(&doc, Utc::now());

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].name, "Spusu 50");
        assert_eq!(plans[0].price_chf, 19.90);
        assert_eq!(plans[0].data_allowance, Allowance::Value("50GB".to_string()));
        assert_eq!(plans[0].minutes, Allowance::Value("1000".to_string()));
        assert_eq!(plans[0].sms, Allowance::Value("500".to_string()));

        assert_eq!(plans[1].minutes, Allowance::Unlimited);
        assert_eq!(plans[1].eu_roaming, Allowance::Unknown);
    }

    #[test]
    fn candidates_without_price_are_skipped() {
        let html = r#"
            <html><body>
              <div class="plan"><h3>Teaser</h3><p>50 GB Daten</p></div>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        assert!(extract_fallback(&doc, Utc::now()).is_empty());
    }

    #[test]
    fn currency_marker_fallback_and_default_name() {
        let html = r#"
            <html><body>
              <p>Jetzt ab CHF 12.50 mit 20 GB</p>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let plans = extract_fallback(&doc, Utc::now());

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "Unknown Plan");
        assert_eq!(plans[0].price_chf, 12.50);
        assert_eq!(plans[0].data_allowance, Allowance::Value("20GB".to_string()));
    }

    #[test]
    fn duplicate_name_price_pairs_are_suppressed() {
        let html = r#"
            <html><body>
              <div class="plan card"><h3>Twin</h3><p>CHF 10.00, 5 GB</p></div>
              <div class="plan"><h3>Twin</h3><p>CHF 10.00, 5 GB</p></div>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let plans = extract_fallback(&doc, Utc::now());
        assert_eq!(plans.len(), 1);
    }
}
