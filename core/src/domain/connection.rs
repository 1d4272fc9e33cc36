//! Established connection records.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::row::{string_at, u64_at};

/// Location label used until a remote IP has been located.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// One established connection to a non-loopback remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub remote_ip: String,
    pub remote_port: String,

    /// Bytes sent (placeholder, traffic is not measured).
    pub upload_bytes: u64,

    /// Bytes received (placeholder, traffic is not measured).
    pub download_bytes: u64,

    /// Human-readable location of the remote IP.
    pub location: String,
}

impl ConnectionInfo {
    /// Create a connection record for a parsed remote endpoint.
    pub fn established(remote_ip: impl Into<String>, remote_port: impl Into<String>) -> Self {
        Self {
            remote_ip: remote_ip.into(),
            remote_port: remote_port.into(),
            upload_bytes: 0,
            download_bytes: 0,
            location: UNKNOWN_LOCATION.to_string(),
        }
    }

    /// Return a copy labelled with the given location.
    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..self
        }
    }

    /// Flat positional form: `[ip, port, upload, download, location]`.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.remote_ip),
            json!(self.remote_port),
            json!(self.upload_bytes),
            json!(self.download_bytes),
            json!(self.location),
        ]
    }

    pub fn from_row(row: &[Value]) -> Self {
        Self {
            remote_ip: string_at(row, 0, ""),
            remote_port: string_at(row, 1, ""),
            upload_bytes: u64_at(row, 2),
            download_bytes: u64_at(row, 3),
            location: string_at(row, 4, UNKNOWN_LOCATION),
        }
    }
}

impl std::fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.remote_ip.contains(':') {
            write!(f, "[{}]:{}", self.remote_ip, self.remote_port)
        } else {
            write!(f, "{}:{}", self.remote_ip, self.remote_port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_established_defaults() {
        let conn = ConnectionInfo::established("203.0.113.1", "443");
        assert_eq!(conn.location, UNKNOWN_LOCATION);
        assert_eq!(conn.upload_bytes, 0);
        assert_eq!(conn.to_string(), "203.0.113.1:443");

        let conn = conn.with_location("LAN");
        assert_eq!(conn.location, "LAN");
    }

    #[test]
    fn test_display_brackets_ipv6() {
        let conn = ConnectionInfo::established("2001:db8::1", "443");
        assert_eq!(conn.to_string(), "[2001:db8::1]:443");
    }

    #[test]
    fn test_row_round_trip() {
        let conn = ConnectionInfo::established("198.51.100.1", "12345").with_location("NL");
        assert_eq!(ConnectionInfo::from_row(&conn.to_row()), conn);
    }

    #[test]
    fn test_from_row_missing_location_is_unknown() {
        let conn = ConnectionInfo::from_row(&[json!("198.51.100.1"), json!("80")]);
        assert_eq!(conn.location, "unknown");
        assert_eq!(conn.download_bytes, 0);
    }
}
