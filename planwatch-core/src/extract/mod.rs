//! Plan extraction from a fetched tariff page
//!
//! Two strategies, tried in order:
//! 1. JSON-LD structured product listings (preferred, field-rich)
//! 2. Free-text scanning of likely tariff containers (crude, lossy)
//!
//! Known limitation: the strategies populate fields differently, and the
//! fallback may produce different `name` strings than the structured data
//! for the same underlying plan. If the page structure changes between two
//! runs, name-keyed change detection can therefore spuriously report new
//! plans or miss changes. This drift is inherent to scraping a page we do
//! not control and is deliberately not papered over.
//!
//! Extraction never fails: transport errors are handled by the caller
//! (as `Snapshot::failed`), and malformed fragments are skipped.

mod fallback;
mod jsonld;
mod scan;

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};

use crate::model::Plan;

/// Parse a static CSS selector. The selectors used here are all literals,
/// so a `None` can only come from a programming error; callers degrade to
/// "nothing extracted" rather than panicking.
fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Extract a deduplicated sequence of plans from a raw HTML document.
///
/// Returns an empty vector when neither strategy finds anything.
pub fn extract_plans(html: &str, now: DateTime<Utc>) -> Vec<Plan> {
    let document = Html::parse_document(html);

    let plans = jsonld::extract_jsonld(&document, now);
    if !plans.is_empty() {
        return plans;
    }

    tracing::info!("no JSON-LD product listings found, trying free-text scan");
    fallback::extract_fallback(&document, now)
}
