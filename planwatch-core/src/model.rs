//! Record types for the price monitor
//!
//! A monitoring run produces a [`Snapshot`]: the set of [`Plan`]s found on
//! the tariff page plus run metadata. Comparing that snapshot against the
//! previous day's entry yields a list of [`Change`]s. The field names mirror
//! the JSON files on disk, so old data files keep loading.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Marker used on the wire for a newly introduced plan.
const NEW_PLAN_MARKER: &str = "NEW_PLAN";

/// An extracted plan attribute: a literal "unlimited" marker, a concrete
/// value such as `"50GB"` or `"1000"`, or nothing extracted at all.
///
/// Distinguishing `Unknown` from `Unlimited` explicitly avoids the ambiguity
/// of overloading one string field for both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Allowance {
    /// The source text carried an unlimited marker phrase
    Unlimited,
    /// A concrete extracted value, e.g. `"50GB"` or `"1000"`
    Value(String),
    /// No pattern matched
    #[default]
    Unknown,
}

impl Allowance {
    /// Whether this attribute was extracted as unlimited
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Allowance::Unlimited)
    }

    /// Whether nothing was extracted for this attribute
    pub fn is_unknown(&self) -> bool {
        matches!(self, Allowance::Unknown)
    }
}

impl From<String> for Allowance {
    fn from(s: String) -> Self {
        match s.as_str() {
            "unlimited" => Allowance::Unlimited,
            // The original data files spell the sentinel with a capital U.
            "Unknown" | "unknown" => Allowance::Unknown,
            _ => Allowance::Value(s),
        }
    }
}

impl From<Allowance> for String {
    fn from(a: Allowance) -> Self {
        match a {
            Allowance::Unlimited => "unlimited".to_string(),
            Allowance::Unknown => "Unknown".to_string(),
            Allowance::Value(v) => v,
        }
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allowance::Unlimited => write!(f, "unlimited"),
            Allowance::Unknown => write!(f, "Unknown"),
            Allowance::Value(v) => write!(f, "{}", v),
        }
    }
}

/// One normalized mobile tariff offering at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Marketing name, unique within a snapshot
    pub name: String,
    /// Monthly price in CHF
    pub price_chf: f64,
    /// Domestic data allowance
    #[serde(default)]
    pub data_allowance: Allowance,
    /// Domestic voice minutes
    #[serde(default)]
    pub minutes: Allowance,
    /// Domestic SMS allowance
    #[serde(default)]
    pub sms: Allowance,
    /// EU roaming data allowance
    #[serde(default)]
    pub eu_roaming: Allowance,
    /// EU roaming minutes
    #[serde(default)]
    pub eu_roaming_minutes: Allowance,
    /// Free-text source the attributes were extracted from, kept for audit
    #[serde(default)]
    pub description: String,
    /// When this plan was extracted
    pub scraped_at: DateTime<Utc>,
}

/// Price movement of one plan between two snapshots: either a numeric delta
/// or the new-plan marker. Serialized as a JSON number or the literal string
/// `"NEW_PLAN"`, matching the original file format.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    /// Plan absent from the prior snapshot
    New,
    /// Price difference `new - old` for a plan present in both snapshots
    Amount(f64),
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Delta::Amount(v) => serializer.serialize_f64(*v),
            Delta::New => serializer.serialize_str(NEW_PLAN_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Amount(f64),
            Marker(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Amount(v) => Ok(Delta::Amount(v)),
            Raw::Marker(_) => Ok(Delta::New),
        }
    }
}

/// Result of comparing one plan across two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Name of the affected plan
    pub plan_name: String,
    /// Prior price; `None` means the plan is new
    pub old_price: Option<f64>,
    /// Current price
    pub new_price: f64,
    /// Numeric delta, or the new-plan marker
    pub change: Delta,
    /// Delta relative to the old price, in percent; `None` for new plans
    /// or when the old price is zero
    pub change_percentage: Option<f64>,
    /// When the change was detected
    pub detected_at: DateTime<Utc>,
}

impl Change {
    /// Build a price-change record for a plan present in both snapshots
    pub fn price_change(
        plan_name: impl Into<String>,
        old_price: f64,
        new_price: f64,
        detected_at: DateTime<Utc>,
    ) -> Self {
        let change_percentage = if old_price != 0.0 {
            Some((new_price - old_price) / old_price * 100.0)
        } else {
            None
        };
        Self {
            plan_name: plan_name.into(),
            old_price: Some(old_price),
            new_price,
            change: Delta::Amount(new_price - old_price),
            change_percentage,
            detected_at,
        }
    }

    /// Build a new-plan record for a plan absent from the prior snapshot
    pub fn new_plan(
        plan_name: impl Into<String>,
        new_price: f64,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            plan_name: plan_name.into(),
            old_price: None,
            new_price,
            change: Delta::New,
            change_percentage: None,
            detected_at,
        }
    }

    /// Whether this change records a newly introduced plan
    pub fn is_new_plan(&self) -> bool {
        self.old_price.is_none()
    }
}

/// One monitoring run's complete plan listing plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Run time
    pub timestamp: DateTime<Utc>,
    /// Page the plans were extracted from
    pub source_url: String,
    /// Plans in discovery order
    pub plans: Vec<Plan>,
    /// Count of `plans`
    pub total_plans: usize,
    /// Changes detected against the prior snapshot, attached after detection
    #[serde(default)]
    pub price_changes: Vec<Change>,
    /// Set when the run failed; implies an empty plan list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Snapshot {
    /// Create a snapshot from a successful extraction
    pub fn new(source_url: impl Into<String>, plans: Vec<Plan>, timestamp: DateTime<Utc>) -> Self {
        let total_plans = plans.len();
        Self {
            timestamp,
            source_url: source_url.into(),
            plans,
            total_plans,
            price_changes: Vec::new(),
            error: None,
        }
    }

    /// Create a snapshot recording a failed run
    pub fn failed(
        source_url: impl Into<String>,
        error: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            source_url: source_url.into(),
            plans: Vec::new(),
            total_plans: 0,
            price_changes: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Whether the run behind this snapshot failed
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Calendar date of the run in local time, used for the
    /// one-entry-per-day history rule
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Local).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowance_roundtrips_through_strings() {
        for (text, expected) in [
            ("unlimited", Allowance::Unlimited),
            ("Unknown", Allowance::Unknown),
            ("unknown", Allowance::Unknown),
            ("50GB", Allowance::Value("50GB".to_string())),
        ] {
            let parsed: Allowance = serde_json::from_value(serde_json::json!(text)).unwrap();
            assert_eq!(parsed, expected);
        }

        let json = serde_json::to_value(Allowance::Unlimited).unwrap();
        assert_eq!(json, serde_json::json!("unlimited"));
        let json = serde_json::to_value(Allowance::Unknown).unwrap();
        assert_eq!(json, serde_json::json!("Unknown"));
    }

    #[test]
    fn delta_serializes_as_number_or_marker() {
        let json = serde_json::to_value(Delta::Amount(-5.0)).unwrap();
        assert_eq!(json, serde_json::json!(-5.0));
        let json = serde_json::to_value(Delta::New).unwrap();
        assert_eq!(json, serde_json::json!("NEW_PLAN"));

        let back: Delta = serde_json::from_value(serde_json::json!("NEW_PLAN")).unwrap();
        assert_eq!(back, Delta::New);
        let back: Delta = serde_json::from_value(serde_json::json!(2.5)).unwrap();
        assert_eq!(back, Delta::Amount(2.5));
    }

    #[test]
    fn price_change_computes_percentage() {
        let change = Change::price_change("Test", 19.90, 24.90, Utc::now());
        assert_eq!(change.old_price, Some(19.90));
        let pct = change.change_percentage.unwrap();
        assert!((pct - 25.125628140703515).abs() < 1e-9);
        assert_eq!(change.change, Delta::Amount(24.90 - 19.90));
        assert!(!change.is_new_plan());
    }

    #[test]
    fn zero_old_price_has_no_percentage() {
        let change = Change::price_change("Free", 0.0, 5.0, Utc::now());
        assert_eq!(change.change_percentage, None);
    }

    #[test]
    fn failed_snapshot_is_empty() {
        let snap = Snapshot::failed("https://example.ch", "timeout", Utc::now());
        assert!(snap.is_failed());
        assert!(snap.plans.is_empty());
        assert_eq!(snap.total_plans, 0);
    }

    #[test]
    fn error_field_is_omitted_when_absent() {
        let snap = Snapshot::new("https://example.ch", Vec::new(), Utc::now());
        let json = serde_json::to_value(&snap).unwrap();
        assert!(json.get("error").is_none());
    }
}
