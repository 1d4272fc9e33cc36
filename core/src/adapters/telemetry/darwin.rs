//! macOS telemetry adapter using `ifconfig`, `netstat -anv` and `ps`.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::adapters::SystemRunner;
use crate::domain::{
    ConnectionInfo, NetworkInterfaceInfo, ProcessInfo, ResourceUsage, ServiceInfo,
};
use crate::ports::{CommandRunner, TelemetryPort};

use super::utils::{
    command_basename, is_loopback_interface, is_loopback_remote, is_valid_pid, is_valid_port,
    normalize_bind_address, parse_usage_line, split_dotted_endpoint, PeerTally,
};

static HEADER_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9]+):").expect("header pattern is valid"));
static HEADER_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9]+)\s").expect("header pattern is valid"));
static RX_BYTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"RX packets \d+\s+bytes (\d+)").expect("rx pattern is valid"));
static TX_BYTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"TX packets \d+\s+bytes (\d+)").expect("tx pattern is valid"));
static NAMED_PID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:\s]+):(\d+)$").expect("pid pattern is valid"));

const UNKNOWN_PROCESS: &str = "unknown";

pub(crate) mod cmd {
    use crate::ports::Invocation;

    pub fn ifconfig() -> Invocation {
        Invocation::new("ifconfig")
    }

    pub fn sockets() -> Invocation {
        Invocation::new("netstat").args(["-anv", "-p", "tcp"])
    }

    pub fn process_name(pid: &str) -> Invocation {
        Invocation::new("ps").args(["-p", pid, "-o", "comm="])
    }

    pub fn usage(pid: &str) -> Invocation {
        Invocation::new("ps").args(["-o", "%cpu,%mem", "-p", pid])
    }
}

fn interface_header(line: &str) -> Option<&str> {
    HEADER_COLON
        .captures(line)
        .or_else(|| HEADER_SPACE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn captured_bytes(pattern: &Regex, line: &str) -> Option<u64> {
    pattern.captures(line)?.get(1)?.as_str().parse().ok()
}

/// Fold state for `ifconfig` output: interfaces so far plus the one whose
/// block is being read.
#[derive(Debug, Default)]
struct IfconfigScan {
    interfaces: Vec<NetworkInterfaceInfo>,
    current: Option<usize>,
}

impl IfconfigScan {
    fn step(mut self, line: &str) -> Self {
        if let Some(name) = interface_header(line) {
            self.current = if is_loopback_interface(name) {
                None
            } else {
                Some(self.register(name))
            };
            return self;
        }

        if let Some(index) = self.current {
            if line.contains("bytes") {
                let interface = &mut self.interfaces[index];
                if let Some(received) = captured_bytes(&RX_BYTES, line) {
                    interface.bytes_received = received;
                }
                if let Some(sent) = captured_bytes(&TX_BYTES, line) {
                    interface.bytes_sent = sent;
                }
            }
        }
        self
    }

    fn register(&mut self, name: &str) -> usize {
        if let Some(index) = self.interfaces.iter().position(|i| i.name == name) {
            return index;
        }
        self.interfaces.push(NetworkInterfaceInfo::without_traffic(name));
        self.interfaces.len() - 1
    }
}

fn parse_ifconfig(lines: &[String]) -> Vec<NetworkInterfaceInfo> {
    let scanned = lines
        .iter()
        .fold(IfconfigScan::default(), |scan, line| scan.step(line))
        .interfaces;

    if scanned.is_empty() {
        fallback_interfaces(lines)
    } else {
        scanned
    }
}

/// Every non-loopback header as a zero-traffic interface.
fn fallback_interfaces(lines: &[String]) -> Vec<NetworkInterfaceInfo> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .filter_map(|line| interface_header(line))
        .filter(|name| !is_loopback_interface(name))
        .filter(|name| seen.insert(name.to_string()))
        .map(NetworkInterfaceInfo::without_traffic)
        .collect()
}

/// Owner of a `netstat -anv` line.
///
/// macOS 13 and later print a `process:pid` column after the byte and
/// buffer counters; older releases print a bare pid at index 8, after
/// `rhiwat shiwat`. The named form is searched first since index 8 holds
/// the numeric `rhiwat` on newer systems.
fn socket_owner(fields: &[&str]) -> Option<(String, Option<String>)> {
    let named = fields.iter().skip(6).find_map(|field| {
        let caps = NAMED_PID.captures(field)?;
        Some((caps[2].to_string(), Some(caps[1].to_string())))
    });
    if named.is_some() {
        return named;
    }

    let pid = fields.get(8)?;
    (!pid.is_empty() && pid.bytes().all(|b| b.is_ascii_digit())).then(|| (pid.to_string(), None))
}

/// A listening socket from `netstat -anv -p tcp`.
#[derive(Debug, Clone, PartialEq)]
struct ListeningSocket {
    address: String,
    port: String,
    pid: String,
    name: Option<String>,
}

fn parse_listening(lines: &[String]) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();

    for line in lines.iter().filter(|l| l.contains("LISTEN")) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }
        let Some((host, port)) = split_dotted_endpoint(fields[3]) else {
            continue;
        };
        if !is_valid_port(port) {
            continue;
        }
        let Some((pid, name)) = socket_owner(&fields) else {
            trace!(line = %line, "Listening line without pid");
            continue;
        };

        let address = normalize_bind_address(host);
        if !seen.insert((address.clone(), port.to_string(), pid.clone())) {
            continue;
        }
        sockets.push(ListeningSocket {
            address,
            port: port.to_string(),
            pid,
            name,
        });
    }

    sockets
}

/// Local port and foreign endpoint of an `ESTABLISHED` line.
fn parse_established(line: &str) -> Option<(&str, &str, &str)> {
    if !line.contains("ESTABLISHED") {
        return None;
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }
    let (_, local_port) = split_dotted_endpoint(fields[3])?;
    let (remote_ip, remote_port) = split_dotted_endpoint(fields[4])?;
    Some((local_port, remote_ip, remote_port))
}

/// macOS implementation of the telemetry contract.
pub struct DarwinAdapter<R = SystemRunner> {
    runner: R,
}

impl DarwinAdapter {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner::new())
    }
}

impl Default for DarwinAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> DarwinAdapter<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn process_name(&self, pid: &str) -> String {
        if !is_valid_pid(pid) {
            debug!(pid, "Rejected invalid pid");
            return UNKNOWN_PROCESS.to_string();
        }

        let lines = self.runner.run(&cmd::process_name(pid)).await;
        match lines.first().map(|line| command_basename(line)) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => UNKNOWN_PROCESS.to_string(),
        }
    }
}

impl<R: CommandRunner> TelemetryPort for DarwinAdapter<R> {
    async fn list_interfaces(&self) -> Vec<NetworkInterfaceInfo> {
        parse_ifconfig(&self.runner.run(&cmd::ifconfig()).await)
    }

    async fn list_services(&self) -> Vec<ServiceInfo> {
        // Listeners and peers come from the same snapshot
        let lines = self.runner.run(&cmd::sockets()).await;
        let sockets = parse_listening(&lines);
        if sockets.is_empty() {
            return Vec::new();
        }

        let mut peers = PeerTally::new();
        for line in &lines {
            if let Some((local_port, remote_ip, _)) = parse_established(line) {
                peers.record(local_port, remote_ip);
            }
        }

        let mut services = Vec::with_capacity(sockets.len());
        for socket in sockets {
            let name = match socket.name {
                Some(name) => name,
                None => self.process_name(&socket.pid).await,
            };
            let usage = self.resource_usage(&socket.pid).await;
            let counts = peers.counts(&socket.port);
            services.push(ServiceInfo::listening(
                socket.pid,
                name,
                socket.address,
                socket.port,
                counts,
                usage,
            ));
        }
        services
    }

    async fn list_connections(&self) -> Vec<ConnectionInfo> {
        self.runner
            .run(&cmd::sockets())
            .await
            .iter()
            .filter_map(|line| parse_established(line))
            .filter(|(_, remote_ip, _)| !is_loopback_remote(remote_ip))
            .map(|(_, remote_ip, remote_port)| ConnectionInfo::established(remote_ip, remote_port))
            .collect()
    }

    async fn list_processes(&self) -> Vec<ProcessInfo> {
        let mut tally = PeerTally::new();
        let mut embedded: Vec<(String, Option<String>)> = Vec::new();

        for line in self.runner.run(&cmd::sockets()).await {
            if !line.contains("ESTABLISHED") {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 9 {
                continue;
            }
            let Some((remote_ip, _)) = split_dotted_endpoint(fields[4]) else {
                continue;
            };
            let Some((pid, name)) = socket_owner(&fields) else {
                continue;
            };
            if !embedded.iter().any(|(known, _)| *known == pid) {
                embedded.push((pid.clone(), name));
            }
            tally.record(&pid, remote_ip);
        }

        let mut processes = Vec::new();
        for (pid, counts) in tally.into_counts() {
            let name = embedded
                .iter()
                .find(|(known, _)| *known == pid)
                .and_then(|(_, name)| name.clone());
            let name = match name {
                Some(name) => name,
                None => self.process_name(&pid).await,
            };
            let usage = self.resource_usage(&pid).await;
            processes.push(ProcessInfo::networked(pid, name, counts, usage));
        }
        processes
    }

    async fn resource_usage(&self, pid: &str) -> ResourceUsage {
        if !is_valid_pid(pid) {
            debug!(pid, "Rejected invalid pid");
            return ResourceUsage::ZERO;
        }

        let lines = self.runner.run(&cmd::usage(pid)).await;
        match lines.last().and_then(|line| parse_usage_line(line)) {
            Some(usage) => usage,
            None => {
                debug!(pid, "No resource usage for pid");
                ResourceUsage::ZERO
            }
        }
    }
}
