//! Telemetry port (interface).

use std::future::Future;

use crate::domain::{ConnectionInfo, NetworkInterfaceInfo, ProcessInfo, ResourceUsage, ServiceInfo};

/// The capability contract every platform adapter implements.
///
/// None of the operations fail: total failure degrades to an empty sequence
/// or a zero-valued record, because the presentation layer renders "no data"
/// rather than handling errors. Sequences keep the order in which records
/// were discovered in command output.
pub trait TelemetryPort: Send + Sync {
    /// Non-loopback interfaces with their cumulative traffic counters.
    fn list_interfaces(&self) -> impl Future<Output = Vec<NetworkInterfaceInfo>> + Send;

    /// One record per unique (local address, local port, pid) listening binding.
    fn list_services(&self) -> impl Future<Output = Vec<ServiceInfo>> + Send;

    /// One record per established connection with a non-loopback remote end.
    fn list_connections(&self) -> impl Future<Output = Vec<ConnectionInfo>> + Send;

    /// Established connections grouped by owning pid.
    fn list_processes(&self) -> impl Future<Output = Vec<ProcessInfo>> + Send;

    /// Current CPU/memory share of `pid`; zero if the pid is invalid or gone.
    fn resource_usage(&self, pid: &str) -> impl Future<Output = ResourceUsage> + Send;
}
