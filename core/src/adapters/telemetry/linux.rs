//! Linux telemetry adapter using net-tools, iproute2, procps and sysfs.

use std::collections::HashSet;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tracing::debug;

use crate::adapters::SystemRunner;
use crate::domain::{
    ConnectionInfo, NetworkInterfaceInfo, ProcessInfo, ResourceUsage, ServiceInfo,
};
use crate::ports::{CommandRunner, TelemetryPort};

use super::utils::{
    is_loopback_interface, is_loopback_remote, is_valid_pid, is_valid_port,
    normalize_bind_address, parse_address, parse_usage_line, PeerTally,
};

/// `tcp  0  0 0.0.0.0:22  0.0.0.0:*  LISTEN  812/sshd`
static LISTEN_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\S+\s+\d+\s+\d+\s+(\S+):(\d+)\s+\S+\s+LISTEN\s+(\d+)/([^\s:]+)")
        .expect("listen pattern is valid")
});

/// `users:(("sshd",pid=812,fd=4))`
static SOCKET_OWNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\("([^"]+)",pid=(\d+)"#).expect("owner pattern is valid"));

pub(crate) mod cmd {
    use crate::ports::Invocation;

    pub fn listening() -> Invocation {
        Invocation::new("netstat").arg("-tulpn")
    }

    pub fn established() -> Invocation {
        Invocation::new("netstat").arg("-tn")
    }

    pub fn sockets() -> Invocation {
        Invocation::new("ss").arg("-tunp")
    }

    pub fn usage(pid: &str) -> Invocation {
        Invocation::new("ps").args(["-p", pid, "-o", "%cpu,%mem"])
    }
}

/// A listening socket as reported by `netstat -tulpn`.
#[derive(Debug, Clone, PartialEq)]
struct ListeningSocket {
    address: String,
    port: String,
    pid: String,
    program: String,
}

fn parse_listening(lines: &[String]) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();

    for line in lines.iter().filter(|l| l.contains("LISTEN")) {
        let Some(caps) = LISTEN_LINE.captures(line) else {
            continue;
        };

        let address = normalize_bind_address(&caps[1]);
        let port = caps[2].to_string();
        let pid = caps[3].to_string();

        if !is_valid_port(&port) {
            continue;
        }
        if !seen.insert((address.clone(), port.clone(), pid.clone())) {
            continue;
        }

        sockets.push(ListeningSocket {
            address,
            port,
            pid,
            program: caps[4].to_string(),
        });
    }

    sockets
}

/// Local and remote endpoints of an `ESTABLISHED` line from `netstat -tn`.
fn parse_established(line: &str) -> Option<((String, u16), (String, u16))> {
    if !line.contains("ESTABLISHED") {
        return None;
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }
    Some((parse_address(fields[3])?, parse_address(fields[4])?))
}

/// Owning pid, program name and peer IP of an `ESTAB` line from `ss -tunp`.
fn parse_socket_owner(line: &str) -> Option<(String, String, String)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let state = fields.iter().position(|f| *f == "ESTAB")?;
    let (peer_ip, _) = parse_address(fields.get(state + 4)?)?;

    let caps = SOCKET_OWNER.captures(line)?;
    Some((caps[2].to_string(), caps[1].to_string(), peer_ip))
}

/// Linux implementation of the telemetry contract.
pub struct LinuxAdapter<R = SystemRunner> {
    runner: R,
    sysfs_root: PathBuf,
}

impl LinuxAdapter {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner::new())
    }
}

impl Default for LinuxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> LinuxAdapter<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            sysfs_root: PathBuf::from("/sys"),
        }
    }

    /// Read interface counters below `root` instead of `/sys`.
    pub fn with_sysfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sysfs_root = root.into();
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn read_counter(&self, interface: &str, counter: &str) -> u64 {
        let path = self
            .sysfs_root
            .join("class/net")
            .join(interface)
            .join("statistics")
            .join(counter);

        match fs::read_to_string(&path).await {
            Ok(content) => content.trim().parse().unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Established connections tallied by local port.
    async fn tally_by_local_port(&self) -> PeerTally {
        let mut tally = PeerTally::new();
        for line in self.runner.run(&cmd::established()).await {
            if let Some(((_, local_port), (remote_ip, _))) = parse_established(&line) {
                tally.record(&local_port.to_string(), &remote_ip);
            }
        }
        tally
    }
}

impl<R: CommandRunner> TelemetryPort for LinuxAdapter<R> {
    async fn list_interfaces(&self) -> Vec<NetworkInterfaceInfo> {
        let net_dir = self.sysfs_root.join("class/net");
        let mut entries = match fs::read_dir(&net_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %net_dir.display(), error = %e, "Cannot enumerate interfaces");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.is_empty() && !is_loopback_interface(&name) {
                names.push(name);
            }
        }
        names.sort();

        let mut interfaces = Vec::with_capacity(names.len());
        for name in names {
            let sent = self.read_counter(&name, "tx_bytes").await;
            let received = self.read_counter(&name, "rx_bytes").await;
            interfaces.push(NetworkInterfaceInfo::new(name, sent, received));
        }
        interfaces
    }

    async fn list_services(&self) -> Vec<ServiceInfo> {
        let sockets = parse_listening(&self.runner.run(&cmd::listening()).await);
        if sockets.is_empty() {
            return Vec::new();
        }

        let peers = self.tally_by_local_port().await;

        let mut services = Vec::with_capacity(sockets.len());
        for socket in sockets {
            let usage = self.resource_usage(&socket.pid).await;
            let counts = peers.counts(&socket.port);
            services.push(ServiceInfo::listening(
                socket.pid,
                socket.program,
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
            .run(&cmd::established())
            .await
            .iter()
            .filter_map(|line| parse_established(line))
            .filter(|(_, (remote_ip, _))| !is_loopback_remote(remote_ip))
            .map(|(_, (remote_ip, remote_port))| {
                ConnectionInfo::established(remote_ip, remote_port.to_string())
            })
            .collect()
    }

    async fn list_processes(&self) -> Vec<ProcessInfo> {
        let mut tally = PeerTally::new();
        let mut names: Vec<(String, String)> = Vec::new();

        for line in self.runner.run(&cmd::sockets()).await {
            if !line.contains("ESTAB") {
                continue;
            }
            let Some((pid, name, peer_ip)) = parse_socket_owner(&line) else {
                continue;
            };
            if !names.iter().any(|(known, _)| *known == pid) {
                names.push((pid.clone(), name));
            }
            tally.record(&pid, &peer_ip);
        }

        let mut processes = Vec::new();
        for (pid, counts) in tally.into_counts() {
            let name = names
                .iter()
                .find(|(known, _)| *known == pid)
                .map(|(_, name)| name.clone())
                .unwrap_or_default();
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
        match lines.get(1).and_then(|line| parse_usage_line(line)) {
            Some(usage) => usage,
            None => {
                debug!(pid, "No resource usage for pid");
                ResourceUsage::ZERO
            }
        }
    }
}
