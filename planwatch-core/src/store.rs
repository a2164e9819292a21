//! Snapshot persistence
//!
//! Two JSON files under the configured data directory: the rolling daily
//! history (array of snapshots, one per calendar day) and the latest
//! snapshot. Files are read fully and rewritten fully; read failures are
//! logged and treated as absent data, since the state is re-derivable from
//! the next run's fresh scrape. Writes are not atomic, which is accepted
//! for the same reason.

use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::model::Snapshot;

/// Rolling history window: two years of daily entries
pub const HISTORY_LIMIT: usize = 730;

/// Loads and saves the history and latest-snapshot files
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
    history_path: PathBuf,
    latest_path: PathBuf,
}

impl SnapshotStore {
    /// Create a store for the configured data directory
    pub fn new(config: &Config) -> Self {
        Self {
            data_dir: config.storage.data_dir.clone(),
            history_path: config.history_path(),
            latest_path: config.latest_path(),
        }
    }

    /// Load the snapshot history, oldest first.
    ///
    /// A missing file yields an empty history; unreadable or unparsable
    /// files are logged and also yield an empty history.
    pub fn load_history(&self) -> Vec<Snapshot> {
        if !self.history_path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(&self.history_path)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_json::from_str::<Vec<Snapshot>>(&contents).map_err(|e| e.to_string())
            }) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(
                    path = %self.history_path.display(),
                    error = %e,
                    "failed to load price history, starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Load the latest snapshot, if one has been stored and parses
    pub fn load_latest(&self) -> Option<Snapshot> {
        if !self.latest_path.exists() {
            return None;
        }
        match fs::read_to_string(&self.latest_path)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_json::from_str::<Snapshot>(&contents).map_err(|e| e.to_string())
            }) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(
                    path = %self.latest_path.display(),
                    error = %e,
                    "failed to load latest snapshot"
                );
                None
            }
        }
    }

    /// Persist the full history as pretty-printed JSON
    pub fn save_history(&self, history: &[Snapshot]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(history)?;
        fs::write(&self.history_path, json)?;
        Ok(())
    }

    /// Persist the latest snapshot, overwriting the previous one
    pub fn save_latest(&self, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.latest_path, json)?;
        Ok(())
    }

    /// Insert a snapshot into the history, keeping one entry per local
    /// calendar day: an existing entry for the snapshot's date is replaced
    /// in place, otherwise the snapshot is appended. The history is then
    /// truncated to the most recent [`HISTORY_LIMIT`] entries.
    pub fn upsert_today(history: &mut Vec<Snapshot>, snapshot: Snapshot) {
        let date = snapshot.local_date();
        if let Some(entry) = history.iter_mut().find(|e| e.local_date() == date) {
            tracing::info!(%date, "replacing existing history entry");
            *entry = snapshot;
        } else {
            tracing::info!(%date, "appending new history entry");
            history.push(snapshot);
        }

        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Change, Plan};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::tempdir;

    fn store_in(dir: &std::path::Path) -> SnapshotStore {
        let mut config = Config::default();
        config.storage.data_dir = dir.to_path_buf();
        SnapshotStore::new(&config)
    }

    fn snapshot_on_day(day: i64, price: f64) -> Snapshot {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(day);
        let plan = Plan {
            name: "Spusu 50".to_string(),
            price_chf: price,
            data_allowance: Default::default(),
            minutes: Default::default(),
            sms: Default::default(),
            eu_roaming: Default::default(),
            eu_roaming_minutes: Default::default(),
            description: "50 GB Daten".to_string(),
            scraped_at: timestamp,
        };
        Snapshot::new("https://example.ch/tariffs", vec![plan], timestamp)
    }

    #[test]
    fn history_roundtrip_preserves_all_fields() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let mut snap = snapshot_on_day(0, 19.90);
        snap.price_changes = vec![
            Change::price_change("Spusu 50", 17.90, 19.90, snap.timestamp),
            Change::new_plan("Spusu XL", 34.90, snap.timestamp),
        ];
        let history = vec![snap, snapshot_on_day(1, 19.90)];

        store.save_history(&history).unwrap();
        assert_eq!(store.load_history(), history);
    }

    #[test]
    fn latest_roundtrip() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let snap = snapshot_on_day(0, 19.90);
        store.save_latest(&snap).unwrap();
        assert_eq!(store.load_latest(), Some(snap));
    }

    #[test]
    fn missing_files_yield_empty_data() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.load_history().is_empty());
        assert!(store.load_latest().is_none());
    }

    #[test]
    fn corrupt_history_is_swallowed() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("price_history.json"), "{not json").unwrap();
        assert!(store.load_history().is_empty());
    }

    #[test]
    fn same_day_run_replaces_entry() {
        let mut history = vec![snapshot_on_day(0, 19.90)];

        let mut rerun = snapshot_on_day(0, 24.90);
        rerun.timestamp += Duration::hours(6);
        let expected = rerun.clone();
        SnapshotStore::upsert_today(&mut history, rerun);

        assert_eq!(history.len(), 1);
        assert_eq!(history[0], expected);
    }

    #[test]
    fn new_day_appends() {
        let mut history = vec![snapshot_on_day(0, 19.90)];
        SnapshotStore::upsert_today(&mut history, snapshot_on_day(1, 19.90));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn history_is_capped_to_the_rolling_window() {
        let mut history = Vec::new();
        for day in 0..(HISTORY_LIMIT as i64 + 5) {
            SnapshotStore::upsert_today(&mut history, snapshot_on_day(day, 19.90));
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        // Oldest entries were evicted, order preserved among survivors
        assert_eq!(history[0].local_date(), snapshot_on_day(5, 0.0).local_date());
        assert_eq!(
            history.last().map(Snapshot::local_date),
            Some(snapshot_on_day(HISTORY_LIMIT as i64 + 4, 0.0).local_date())
        );
    }
}
