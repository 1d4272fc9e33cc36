//! Listening service records.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::row::{f64_at, string_at, u32_at, u64_at};
use super::ResourceUsage;

/// Distinct remote peers and total connections seen for one key
/// (a listening port or an owning pid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerCounts {
    /// Number of distinct remote IP addresses.
    pub distinct_ips: u32,

    /// Number of established connections.
    pub connections: u32,
}

/// A process bound to a local address/port in the listening state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Owning process id, as reported by the platform tool.
    pub pid: String,

    /// Program name of the owning process.
    pub service_name: String,

    /// Bound local address; `*` for the wildcard address.
    pub bind_address: String,

    /// Bound local port.
    pub port: String,

    /// Distinct remote IPs currently connected to this port.
    pub distinct_remote_ip_count: u32,

    /// Established connections to this port.
    pub connection_count: u32,

    /// Bytes sent (placeholder, traffic is not measured).
    pub upload_bytes: u64,

    /// Bytes received (placeholder, traffic is not measured).
    pub download_bytes: u64,

    /// CPU usage of the owning process in percent.
    pub cpu_percent: f64,

    /// Memory usage of the owning process in percent.
    pub mem_percent: f64,
}

impl ServiceInfo {
    /// Create a service record from a parsed listening binding.
    pub fn listening(
        pid: impl Into<String>,
        service_name: impl Into<String>,
        bind_address: impl Into<String>,
        port: impl Into<String>,
        peers: PeerCounts,
        usage: ResourceUsage,
    ) -> Self {
        Self {
            pid: pid.into(),
            service_name: service_name.into(),
            bind_address: bind_address.into(),
            port: port.into(),
            distinct_remote_ip_count: peers.distinct_ips,
            connection_count: peers.connections,
            upload_bytes: 0,
            download_bytes: 0,
            cpu_percent: usage.cpu_percent,
            mem_percent: usage.mem_percent,
        }
    }

    /// Resource usage embedded at construction time.
    pub fn usage(&self) -> ResourceUsage {
        ResourceUsage::new(self.cpu_percent, self.mem_percent)
    }

    /// Whether the service accepts connections on every local address.
    pub fn is_wildcard(&self) -> bool {
        self.bind_address == "*"
    }

    /// Flat positional form, in field declaration order.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.pid),
            json!(self.service_name),
            json!(self.bind_address),
            json!(self.port),
            json!(self.distinct_remote_ip_count),
            json!(self.connection_count),
            json!(self.upload_bytes),
            json!(self.download_bytes),
            json!(self.cpu_percent),
            json!(self.mem_percent),
        ]
    }

    pub fn from_row(row: &[Value]) -> Self {
        Self {
            pid: string_at(row, 0, ""),
            service_name: string_at(row, 1, ""),
            bind_address: string_at(row, 2, ""),
            port: string_at(row, 3, ""),
            distinct_remote_ip_count: u32_at(row, 4),
            connection_count: u32_at(row, 5),
            upload_bytes: u64_at(row, 6),
            download_bytes: u64_at(row, 7),
            cpu_percent: f64_at(row, 8),
            mem_percent: f64_at(row, 9),
        }
    }
}

impl std::fmt::Display for ServiceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} (PID: {}, Service: {})",
            self.bind_address, self.port, self.pid, self.service_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nginx() -> ServiceInfo {
        ServiceInfo::listening(
            "1234",
            "nginx",
            "*",
            "80",
            PeerCounts {
                distinct_ips: 2,
                connections: 3,
            },
            ResourceUsage::new(2.5, 10.3),
        )
    }

    #[test]
    fn test_listening_service() {
        let service = nginx();
        assert!(service.is_wildcard());
        assert_eq!(service.connection_count, 3);
        assert_eq!(service.upload_bytes, 0);
        assert_eq!(service.usage(), ResourceUsage::new(2.5, 10.3));
        assert_eq!(service.to_string(), "*:80 (PID: 1234, Service: nginx)");
    }

    #[test]
    fn test_row_round_trip() {
        let service = nginx();
        assert_eq!(ServiceInfo::from_row(&service.to_row()), service);
    }

    #[test]
    fn test_from_row_fills_missing_trailing_fields() {
        let row = vec![json!("42"), json!("sshd"), json!("*"), json!("22"), json!(1), json!(1)];
        let service = ServiceInfo::from_row(&row);

        assert_eq!(service.port, "22");
        assert_eq!(service.upload_bytes, 0);
        assert_eq!(service.cpu_percent, 0.0);
        assert_eq!(service.mem_percent, 0.0);
    }
}
