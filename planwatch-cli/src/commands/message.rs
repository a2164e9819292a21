//! Message command - render a notification from a recorded change log

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::Args;
use planwatch_core::{render_message, Config, SnapshotStore};

/// Render the notification message for a change-log file
#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Path to the change-log file produced by a monitoring run
    pub change_log: PathBuf,
}

impl MessageArgs {
    /// Execute the message command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let text = fs::read_to_string(&self.change_log)
            .with_context(|| format!("failed to read change log {}", self.change_log.display()))?;

        let store = SnapshotStore::new(config);
        let latest = store.load_latest();

        let message = render_message(
            &text,
            latest.as_ref(),
            &config.monitor.base_url,
            Local::now(),
        );
        println!("{}", message);
        Ok(())
    }
}
