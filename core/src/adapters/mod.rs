//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`:
//! the process-spawning command runner and the per-platform telemetry
//! adapters built on top of it.

mod command;
pub mod telemetry;

#[cfg(test)]
mod scripted;

pub use command::SystemRunner;
pub use telemetry::{DarwinAdapter, LinuxAdapter, Platform, PlatformAdapter, WindowsAdapter};

#[cfg(test)]
pub(crate) use scripted::ScriptedRunner;
