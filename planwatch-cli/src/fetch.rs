//! Tariff page fetching
//!
//! The only network call in the system. Failures are returned as
//! `Error::Fetch` so the monitor can record them in a failed snapshot
//! instead of aborting the run.

use std::time::Duration;

use planwatch_core::config::MonitorConfig;
use planwatch_core::{Error, Result};

/// Fetch the configured tariff page and return its body
pub async fn fetch_page(config: &MonitorConfig) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| Error::Fetch(format!("failed to build HTTP client: {}", e)))?;

    let response = client
        .get(&config.base_url)
        .header("User-Agent", &config.user_agent)
        .send()
        .await
        .map_err(|e| Error::Fetch(format!("request to {} failed: {}", config.base_url, e)))?;

    let response = response.error_for_status().map_err(|e| {
        Error::Fetch(format!(
            "request to {} returned an error status: {}",
            config.base_url, e
        ))
    })?;

    response
        .text()
        .await
        .map_err(|e| Error::Fetch(format!("failed to read response body: {}", e)))
}
