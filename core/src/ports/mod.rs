//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces the application layer uses to interact
//! with the operating system. Implementations live in `adapters`.

mod runner;
mod telemetry;

pub use runner::{CommandRunner, Invocation};
pub use telemetry::TelemetryPort;
