//! Application layer - Use case services.
//!
//! The monitor is a thin orchestrator: it takes a telemetry port, forwards
//! queries to it, and hands domain types back to the presentation layer.

mod locator;
mod monitor;

pub use locator::{Locator, ScopeLocator};
pub use monitor::NetworkMonitor;
