//! tmd-top Core Library
//!
//! Cross-platform network and process telemetry read from the host's own
//! diagnostic commands. Provides functionality to:
//! - List network interfaces with their traffic counters
//! - List listening services with peer counts and resource usage
//! - List established connections to remote hosts
//! - Group established connections by owning process
//! - Resolve CPU/memory usage for a pid
//!
//! None of the telemetry queries fail: a missing tool, a permission problem
//! or unparsable output all degrade to "no data" and are logged through
//! `tracing`.
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Value types and IP scope classification
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: Command runner and per-platform telemetry adapters
//! - `application`: The `NetworkMonitor` facade and location labels
//!
//! # Platform Support
//! - Linux: `netstat`, `ss`, `ps` and sysfs interface counters
//! - macOS: `ifconfig`, `netstat -anv` and `ps`
//! - Windows: `netstat -ano`, `tasklist` and PowerShell

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export domain types (primary API)
pub use domain::{
    classify_ip, is_private_ip, ConnectionInfo, IpScope, NetworkInterfaceInfo, PeerCounts,
    ProcessInfo, ResourceUsage, ServiceInfo,
};

// Re-export other commonly used types
pub use adapters::{Platform, PlatformAdapter, SystemRunner};
pub use application::{Locator, NetworkMonitor, ScopeLocator};
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use ports::{CommandRunner, Invocation, TelemetryPort};
