//! Parsing helpers shared by the platform adapters.

use std::collections::{HashMap, HashSet};

use crate::domain::{PeerCounts, ResourceUsage};

/// Largest pid any adapter will pass to a command.
pub const MAX_PID: u64 = 100_000;

/// Guard applied before a pid reaches any command invocation.
///
/// Valid pids are non-empty, ASCII decimal digits only, and at most
/// [`MAX_PID`].
pub fn is_valid_pid(pid: &str) -> bool {
    !pid.is_empty()
        && pid.bytes().all(|b| b.is_ascii_digit())
        && pid.parse::<u64>().is_ok_and(|value| value <= MAX_PID)
}

/// All digits, fits a `u16`, non-zero.
pub fn is_valid_port(port: &str) -> bool {
    !port.is_empty()
        && port.bytes().all(|b| b.is_ascii_digit())
        && port.parse::<u16>().is_ok_and(|value| value != 0)
}

/// Parse an address:port string.
///
/// Handles multiple address formats:
/// - IPv4: "127.0.0.1:3000" or "*:8080"
/// - IPv6: "\[::1]:3000", "\[fe80::1]:8080" or unbracketed ":::22"
///
/// Brackets are stripped from the returned host.
pub fn parse_address(address: &str) -> Option<(String, u16)> {
    if let Some(rest) = address.strip_prefix('[') {
        // IPv6 format: [::1]:3000
        let bracket_end = rest.find(']')?;
        let host = &rest[..bracket_end];
        let port_str = rest[bracket_end + 1..].strip_prefix(':')?;
        let port: u16 = port_str.parse().ok()?;
        Some((host.to_string(), port))
    } else {
        // IPv4 format, or IPv6 with the port after the last colon
        let last_colon = address.rfind(':')?;
        let host = &address[..last_colon];
        let port: u16 = address[last_colon + 1..].parse().ok()?;
        let host = if host.is_empty() { "*" } else { host };
        Some((host.to_string(), port))
    }
}

/// Split a BSD `netstat` endpoint such as `192.168.1.5.443` or `*.22`.
///
/// The port is the trailing dot-separated component and must be numeric.
pub fn split_dotted_endpoint(endpoint: &str) -> Option<(&str, &str)> {
    let (host, port) = endpoint.rsplit_once('.')?;
    if host.is_empty() || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((host, port))
}

/// Collapse the spellings of "any address" to `*`.
pub fn normalize_bind_address(address: &str) -> String {
    match address {
        "" | "*" | "0.0.0.0" | "::" | "[::]" => "*".to_string(),
        other => other.to_string(),
    }
}

pub fn is_loopback_interface(name: &str) -> bool {
    name == "lo" || name == "lo0" || name.to_ascii_lowercase().contains("loopback")
}

pub fn is_loopback_remote(ip: &str) -> bool {
    matches!(ip, "127.0.0.1" | "::1" | "::ffff:127.0.0.1")
}

/// Parse a CSV line, handling quoted fields.
///
/// Empty fields are kept and `""` inside quotes is an escaped quote, which is
/// how PowerShell's `ConvertTo-Csv` writes them.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.trim_end_matches(['\r', '\n']).chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
}

/// Case-insensitive position of `column` in a CSV header row.
pub fn column_index(header: &[String], column: &str) -> Option<usize> {
    header
        .iter()
        .position(|name| name.trim().eq_ignore_ascii_case(column))
}

/// First two whitespace-separated floats of a `ps` line.
pub fn parse_usage_line(line: &str) -> Option<ResourceUsage> {
    let mut fields = line.split_whitespace();
    let cpu: f64 = fields.next()?.parse().ok()?;
    let mem: f64 = fields.next()?.parse().ok()?;
    Some(ResourceUsage::new(cpu, mem))
}

/// Last path component of a command path (`/usr/sbin/sshd` -> `sshd`).
pub fn command_basename(command: &str) -> &str {
    let command = command.trim();
    command
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or(command)
}

/// Distinct remote IPs and connection counts per key, in first-seen key order.
#[derive(Debug, Default)]
pub struct PeerTally {
    order: Vec<String>,
    peers: HashMap<String, (HashSet<String>, u32)>,
}

impl PeerTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one connection from `remote_ip` against `key`.
    pub fn record(&mut self, key: &str, remote_ip: &str) {
        if !self.peers.contains_key(key) {
            self.order.push(key.to_string());
        }
        let (ips, connections) = self.peers.entry(key.to_string()).or_default();
        ips.insert(remote_ip.to_string());
        *connections += 1;
    }

    pub fn counts(&self, key: &str) -> PeerCounts {
        self.peers
            .get(key)
            .map(|(ips, connections)| PeerCounts {
                distinct_ips: u32::try_from(ips.len()).unwrap_or(u32::MAX),
                connections: *connections,
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys with their counts, in the order the keys were first recorded.
    pub fn into_counts(self) -> Vec<(String, PeerCounts)> {
        let counts: Vec<PeerCounts> = self.order.iter().map(|key| self.counts(key)).collect();
        self.order.into_iter().zip(counts).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_guard() {
        assert!(is_valid_pid("1"));
        assert!(is_valid_pid("100000"));
        assert!(!is_valid_pid("100001"));
        assert!(!is_valid_pid(""));
        assert!(!is_valid_pid("-1"));
        assert!(!is_valid_pid("+5"));
        assert!(!is_valid_pid("1.5"));
        assert!(!is_valid_pid("12; rm -rf /"));
        assert!(!is_valid_pid("99999999999999999999999"));
        assert!(!is_valid_pid("١٢"));
    }

    #[test]
    fn test_port_guard() {
        assert!(is_valid_port("22"));
        assert!(is_valid_port("65535"));
        assert!(!is_valid_port("0"));
        assert!(!is_valid_port("65536"));
        assert!(!is_valid_port("*"));
        assert!(!is_valid_port(""));
    }

    #[test]
    fn test_parse_ipv4_address() {
        let (addr, port) = parse_address("127.0.0.1:3000").unwrap();
        assert_eq!(addr, "127.0.0.1");
        assert_eq!(port, 3000);

        let (addr, port) = parse_address("*:8080").unwrap();
        assert_eq!(addr, "*");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_ipv6_address() {
        let (addr, port) = parse_address("[::1]:3000").unwrap();
        assert_eq!(addr, "::1");
        assert_eq!(port, 3000);

        let (addr, port) = parse_address("[fe80::1]:8080").unwrap();
        assert_eq!(addr, "fe80::1");
        assert_eq!(port, 8080);

        let (addr, port) = parse_address(":::22").unwrap();
        assert_eq!(addr, "::");
        assert_eq!(port, 22);
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(parse_address("no-port").is_none());
        assert!(parse_address("1.2.3.4:*").is_none());
        assert!(parse_address("[::1]3000").is_none());
        assert!(parse_address("[::1").is_none());
    }

    #[test]
    fn test_split_dotted_endpoint() {
        assert_eq!(split_dotted_endpoint("192.168.1.5.443"), Some(("192.168.1.5", "443")));
        assert_eq!(split_dotted_endpoint("*.22"), Some(("*", "22")));
        assert_eq!(split_dotted_endpoint("fe80::1%lo0.631"), Some(("fe80::1%lo0", "631")));
        assert_eq!(split_dotted_endpoint("*.*"), None);
        assert_eq!(split_dotted_endpoint("nodots"), None);
    }

    #[test]
    fn test_normalize_bind_address() {
        for wildcard in ["", "*", "0.0.0.0", "::", "[::]"] {
            assert_eq!(normalize_bind_address(wildcard), "*");
        }
        assert_eq!(normalize_bind_address("127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_loopback_checks() {
        assert!(is_loopback_interface("lo"));
        assert!(is_loopback_interface("lo0"));
        assert!(is_loopback_interface("Loopback Pseudo-Interface 1"));
        assert!(!is_loopback_interface("eth0"));
        assert!(!is_loopback_interface("lo1x"));

        assert!(is_loopback_remote("127.0.0.1"));
        assert!(is_loopback_remote("::1"));
        assert!(!is_loopback_remote("10.0.0.1"));
    }

    #[test]
    fn test_parse_csv_line() {
        assert_eq!(
            parse_csv_line(r#""node.exe","5432","Console","1","45,000 K""#),
            vec!["node.exe", "5432", "Console", "1", "45,000 K"]
        );
        assert_eq!(parse_csv_line(r#""a",,"c""#), vec!["a", "", "c"]);
        assert_eq!(parse_csv_line(r#""say ""hi""",2"#), vec![r#"say "hi""#, "2"]);
        assert_eq!(parse_csv_line("plain,1\r"), vec!["plain", "1"]);
    }

    #[test]
    fn test_column_index() {
        let header = parse_csv_line(r#""Name","SentBytes","ReceivedBytes""#);
        assert_eq!(column_index(&header, "receivedbytes"), Some(2));
        assert_eq!(column_index(&header, "Missing"), None);
    }

    #[test]
    fn test_parse_usage_line() {
        let usage = parse_usage_line("  3.5  1.2").unwrap();
        assert_eq!(usage, ResourceUsage::new(3.5, 1.2));
        assert!(parse_usage_line("%CPU %MEM").is_none());
        assert!(parse_usage_line("4.0").is_none());
    }

    #[test]
    fn test_command_basename() {
        assert_eq!(command_basename("/usr/sbin/sshd"), "sshd");
        assert_eq!(command_basename("launchd"), "launchd");
        assert_eq!(command_basename(" /Applications/App.app/Contents/MacOS/App \n"), "App");
    }

    #[test]
    fn test_peer_tally() {
        let mut tally = PeerTally::new();
        assert!(tally.is_empty());

        tally.record("200", "10.0.0.1");
        tally.record("100", "10.0.0.2");
        tally.record("200", "10.0.0.3");
        tally.record("200", "10.0.0.1");

        assert_eq!(
            tally.counts("200"),
            PeerCounts {
                distinct_ips: 2,
                connections: 3
            }
        );
        assert_eq!(tally.counts("missing"), PeerCounts::default());

        let keys: Vec<String> = tally.into_counts().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["200", "100"]);
    }
}
