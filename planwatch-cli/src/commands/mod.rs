//! CLI command implementations

pub mod message;
pub mod monitor;
pub mod status;

pub use message::MessageArgs;
pub use monitor::MonitorArgs;
pub use status::StatusArgs;
