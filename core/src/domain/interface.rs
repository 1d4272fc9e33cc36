//! Network interface traffic counters.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::row::{string_at, u64_at};

/// Cumulative traffic counters of one non-loopback network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterfaceInfo {
    /// Interface name (e.g., "eth0", "en0", "Ethernet").
    pub name: String,

    /// Total bytes transmitted since the counter was reset.
    pub bytes_sent: u64,

    /// Total bytes received since the counter was reset.
    pub bytes_received: u64,
}

impl NetworkInterfaceInfo {
    pub fn new(name: impl Into<String>, bytes_sent: u64, bytes_received: u64) -> Self {
        Self {
            name: name.into(),
            bytes_sent,
            bytes_received,
        }
    }

    /// An interface whose counters could not be read.
    pub fn without_traffic(name: impl Into<String>) -> Self {
        Self::new(name, 0, 0)
    }

    /// Flat positional form: `[name, sent, received]`.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.name),
            json!(self.bytes_sent),
            json!(self.bytes_received),
        ]
    }

    pub fn from_row(row: &[Value]) -> Self {
        Self::new(string_at(row, 0, ""), u64_at(row, 1), u64_at(row, 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip() {
        let iface = NetworkInterfaceInfo::new("eth0", 1_024, 2_048);
        assert_eq!(NetworkInterfaceInfo::from_row(&iface.to_row()), iface);
    }

    #[test]
    fn test_from_row_defaults() {
        let iface = NetworkInterfaceInfo::from_row(&[json!("en0")]);
        assert_eq!(iface, NetworkInterfaceInfo::without_traffic("en0"));
    }
}
