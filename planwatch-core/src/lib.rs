//! Planwatch Core - Core library for the planwatch price monitor
//!
//! This crate provides the extraction, change-detection, persistence and
//! message-rendering pipeline for monitoring published mobile-plan pricing.
//! Network fetching and the command-line surface live in `planwatch-cli`.

pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod store;

pub use config::Config;
pub use detect::detect_changes;
pub use error::{Error, Result};
pub use extract::extract_plans;
pub use model::{Allowance, Change, Delta, Plan, Snapshot};
pub use render::render_message;
pub use store::SnapshotStore;
