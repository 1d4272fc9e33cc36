//! Processes with network activity.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::row::{f64_at, string_at, u32_at, u64_at};
use super::{PeerCounts, ResourceUsage};

/// Region label used until a process has been attributed to a region.
pub const DEFAULT_REGION: &str = "other";

/// A process owning at least one established connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: String,
    pub name: String,

    /// Distinct remote IPs this process is connected to.
    pub distinct_remote_ip_count: u32,

    /// Established connections owned by this process.
    pub connection_count: u32,

    /// Bytes sent (placeholder, traffic is not measured).
    pub upload_bytes: u64,

    /// Bytes received (placeholder, traffic is not measured).
    pub download_bytes: u64,

    /// CPU usage in percent.
    pub cpu_percent: f64,

    pub region: String,
}

impl ProcessInfo {
    /// Create a process record from its grouped connections.
    pub fn networked(
        pid: impl Into<String>,
        name: impl Into<String>,
        peers: PeerCounts,
        usage: ResourceUsage,
    ) -> Self {
        Self {
            pid: pid.into(),
            name: name.into(),
            distinct_remote_ip_count: peers.distinct_ips,
            connection_count: peers.connections,
            upload_bytes: 0,
            download_bytes: 0,
            cpu_percent: usage.cpu_percent,
            region: DEFAULT_REGION.to_string(),
        }
    }

    /// Flat positional form, in field declaration order.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.pid),
            json!(self.name),
            json!(self.distinct_remote_ip_count),
            json!(self.connection_count),
            json!(self.upload_bytes),
            json!(self.download_bytes),
            json!(self.cpu_percent),
            json!(self.region),
        ]
    }

    pub fn from_row(row: &[Value]) -> Self {
        Self {
            pid: string_at(row, 0, ""),
            name: string_at(row, 1, ""),
            distinct_remote_ip_count: u32_at(row, 2),
            connection_count: u32_at(row, 3),
            upload_bytes: u64_at(row, 4),
            download_bytes: u64_at(row, 5),
            cpu_percent: f64_at(row, 6),
            region: string_at(row, 7, DEFAULT_REGION),
        }
    }
}
