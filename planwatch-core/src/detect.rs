//! Change detection between the current snapshot and the stored history

use std::collections::HashMap;

use chrono::Utc;

use crate::model::{Change, Plan, Snapshot};

/// Diff the current snapshot against the most recent historical entry.
///
/// Plans are keyed by exact name. A differing price yields a price-change
/// record, a name absent from the baseline yields a new-plan record, and a
/// plan that disappeared produces nothing (removals are not tracked).
/// Without a baseline (empty history, or a last entry with no plans) the
/// result is empty.
///
/// Prices are compared with exact inequality. The page publishes fixed
/// price points, not computed values, so any difference is a real change.
pub fn detect_changes(current: &Snapshot, history: &[Snapshot]) -> Vec<Change> {
    let mut changes = Vec::new();

    let Some(baseline) = history.last() else {
        return changes;
    };
    if baseline.plans.is_empty() {
        return changes;
    }

    let last_plans: HashMap<&str, &Plan> = baseline
        .plans
        .iter()
        .map(|plan| (plan.name.as_str(), plan))
        .collect();

    let detected_at = Utc::now();
    for plan in &current.plans {
        match last_plans.get(plan.name.as_str()) {
            Some(last) if last.price_chf != plan.price_chf => {
                changes.push(Change::price_change(
                    &plan.name,
                    last.price_chf,
                    plan.price_chf,
                    detected_at,
                ));
            }
            Some(_) => {}
            None => {
                changes.push(Change::new_plan(&plan.name, plan.price_chf, detected_at));
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Allowance, Delta};
    use chrono::{DateTime, Utc};

    fn plan(name: &str, price: f64) -> Plan {
        Plan {
            name: name.to_string(),
            price_chf: price,
            data_allowance: Allowance::Unknown,
            minutes: Allowance::Unknown,
            sms: Allowance::Unknown,
            eu_roaming: Allowance::Unknown,
            eu_roaming_minutes: Allowance::Unknown,
            description: String::new(),
            scraped_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn snapshot(plans: Vec<Plan>) -> Snapshot {
        Snapshot::new("https://example.ch/tariffs", plans, Utc::now())
    }

    #[test]
    fn no_baseline_means_no_changes() {
        let current = snapshot(vec![plan("A", 10.0)]);
        assert!(detect_changes(&current, &[]).is_empty());
    }

    #[test]
    fn empty_baseline_plans_mean_no_changes() {
        let current = snapshot(vec![plan("A", 10.0)]);
        let failed = Snapshot::failed("https://example.ch/tariffs", "timeout", Utc::now());
        assert!(detect_changes(&current, &[failed]).is_empty());
    }

    #[test]
    fn identical_snapshots_produce_nothing() {
        let current = snapshot(vec![plan("A", 10.0), plan("B", 20.0)]);
        let history = vec![snapshot(vec![plan("A", 10.0), plan("B", 20.0)])];
        assert!(detect_changes(&current, &history).is_empty());
    }

    #[test]
    fn price_difference_is_reported() {
        let current = snapshot(vec![plan("A", 24.90)]);
        let history = vec![snapshot(vec![plan("A", 19.90)])];

        let changes = detect_changes(&current, &history);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].plan_name, "A");
        assert_eq!(changes[0].old_price, Some(19.90));
        assert_eq!(changes[0].new_price, 24.90);
        assert_eq!(changes[0].change, Delta::Amount(24.90 - 19.90));
        assert!(changes[0].change_percentage.unwrap() > 25.0);
    }

    #[test]
    fn unknown_name_is_a_new_plan() {
        let current = snapshot(vec![plan("Fresh", 15.0)]);
        let history = vec![snapshot(vec![plan("A", 10.0)])];

        let changes = detect_changes(&current, &history);
        assert_eq!(changes.len(), 1);
        assert!(changes[0].is_new_plan());
        assert_eq!(changes[0].old_price, None);
        assert_eq!(changes[0].new_price, 15.0);
        assert_eq!(changes[0].change, Delta::New);
        assert_eq!(changes[0].change_percentage, None);
    }

    #[test]
    fn removed_plans_are_not_tracked() {
        let current = snapshot(vec![plan("A", 10.0)]);
        let history = vec![snapshot(vec![plan("A", 10.0), plan("Gone", 20.0)])];
        assert!(detect_changes(&current, &history).is_empty());
    }

    #[test]
    fn only_last_history_entry_is_the_baseline() {
        let current = snapshot(vec![plan("A", 10.0)]);
        let history = vec![
            snapshot(vec![plan("A", 99.0)]),
            snapshot(vec![plan("A", 10.0)]),
        ];
        assert!(detect_changes(&current, &history).is_empty());
    }

    #[test]
    fn changes_follow_current_plan_order() {
        let current = snapshot(vec![plan("B", 2.0), plan("A", 9.0)]);
        let history = vec![snapshot(vec![plan("A", 10.0), plan("B", 1.0)])];

        let changes = detect_changes(&current, &history);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].plan_name, "B");
        assert_eq!(changes[1].plan_name, "A");
    }
}
