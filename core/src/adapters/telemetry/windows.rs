//! Windows telemetry adapter using `netstat -ano`, `tasklist` and PowerShell.
//!
//! Interface counters come from `Get-NetAdapterStatistics`, with the WMI
//! raw performance counters as a fallback for hosts without the NetAdapter
//! module. Both sources are CSV and are read by header name, because `wmic`
//! orders its columns alphabetically rather than as requested.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::adapters::SystemRunner;
use crate::domain::{
    ConnectionInfo, NetworkInterfaceInfo, ProcessInfo, ResourceUsage, ServiceInfo,
};
use crate::ports::{CommandRunner, TelemetryPort};

use super::utils::{
    column_index, is_loopback_interface, is_loopback_remote, is_valid_pid, is_valid_port,
    normalize_bind_address, parse_address, parse_csv_line, PeerTally,
};

const UNKNOWN_PROCESS: &str = "unknown";

/// Windows reports CPU as total processor seconds; scaled into a rough percent.
const CPU_SECONDS_DIVISOR: f64 = 100.0;

pub(crate) mod cmd {
    use crate::ports::Invocation;

    fn powershell(script: impl Into<String>) -> Invocation {
        Invocation::new("powershell").args(["-NoProfile", "-Command"]).arg(script)
    }

    pub fn adapter_statistics() -> Invocation {
        powershell(
            "Get-NetAdapterStatistics | Select-Object Name,SentBytes,ReceivedBytes | ConvertTo-Csv -NoTypeInformation",
        )
    }

    pub fn interface_counters() -> Invocation {
        Invocation::new("wmic").args([
            "path",
            "Win32_PerfRawData_Tcpip_NetworkInterface",
            "get",
            "Name,BytesSentPersec,BytesReceivedPersec",
            "/format:csv",
        ])
    }

    pub fn sockets() -> Invocation {
        Invocation::new("netstat").arg("-ano")
    }

    pub fn tasklist() -> Invocation {
        Invocation::new("tasklist").args(["/FO", "CSV", "/NH"])
    }

    /// Only called with a pid that passed the pid guard.
    pub fn process_stats(pid: &str) -> Invocation {
        powershell(format!(
            "Get-Process -Id {} | Select-Object CPU,WorkingSet64 | ConvertTo-Csv -NoTypeInformation",
            pid
        ))
    }

    pub fn total_memory() -> Invocation {
        powershell("(Get-CimInstance Win32_ComputerSystem).TotalPhysicalMemory")
    }
}

/// Header-driven extraction of interface counters from CSV output.
fn parse_counter_csv(
    lines: &[String],
    name_column: &str,
    sent_column: &str,
    received_column: &str,
) -> Vec<NetworkInterfaceInfo> {
    let mut rows = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(parse_csv_line);

    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let (Some(name_at), Some(sent_at), Some(received_at)) = (
        column_index(&header, name_column),
        column_index(&header, sent_column),
        column_index(&header, received_column),
    ) else {
        debug!(?header, "Interface CSV is missing expected columns");
        return Vec::new();
    };

    rows.filter_map(|fields| {
        let name = fields.get(name_at)?.trim();
        let sent = fields.get(sent_at)?.trim().parse().ok()?;
        let received = fields.get(received_at)?.trim().parse().ok()?;
        if name.is_empty() || is_loopback_interface(name) {
            return None;
        }
        Some(NetworkInterfaceInfo::new(name, sent, received))
    })
    .collect()
}

/// Pid to image name, with the `.exe` suffix removed.
fn parse_tasklist(lines: &[String]) -> HashMap<String, String> {
    let mut names = HashMap::new();

    for line in lines {
        let fields = parse_csv_line(line.trim());
        if fields.len() < 2 {
            continue;
        }
        let pid = fields[1].trim();
        if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let name = fields[0].strip_suffix(".exe").unwrap_or(&fields[0]);
        names.insert(pid.to_string(), name.to_string());
    }

    names
}

/// One `netstat -ano` TCP row.
#[derive(Debug, Clone, PartialEq)]
struct SocketRow<'a> {
    local: &'a str,
    remote: &'a str,
    state: &'a str,
    pid: &'a str,
}

fn parse_socket_row(line: &str) -> Option<SocketRow<'_>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }
    Some(SocketRow {
        local: fields[1],
        remote: fields[2],
        state: fields[3],
        pid: fields[4],
    })
}

fn established_rows(lines: &[String]) -> impl Iterator<Item = SocketRow<'_>> {
    lines
        .iter()
        .filter_map(|line| parse_socket_row(line))
        .filter(|row| row.state == "ESTABLISHED")
}

fn process_name(names: &HashMap<String, String>, pid: &str) -> String {
    names
        .get(pid)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_PROCESS.to_string())
}

/// CPU seconds and working set bytes from `Get-Process` CSV.
fn parse_process_stats(lines: &[String]) -> (Option<f64>, Option<f64>) {
    let mut rows = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(parse_csv_line);

    let (Some(header), Some(values)) = (rows.next(), rows.next()) else {
        return (None, None);
    };

    let field = |column: &str| -> Option<f64> {
        let index = column_index(&header, column)?;
        values.get(index)?.trim().parse().ok()
    };

    (field("CPU"), field("WorkingSet64"))
}

/// Windows implementation of the telemetry contract.
pub struct WindowsAdapter<R = SystemRunner> {
    runner: R,
}

impl WindowsAdapter {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner::new())
    }
}

impl Default for WindowsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> WindowsAdapter<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn process_names(&self) -> HashMap<String, String> {
        parse_tasklist(&self.runner.run(&cmd::tasklist()).await)
    }

    async fn total_memory(&self) -> Option<f64> {
        self.runner
            .run(&cmd::total_memory())
            .await
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
            .and_then(|line| line.parse().ok())
    }
}

impl<R: CommandRunner> TelemetryPort for WindowsAdapter<R> {
    async fn list_interfaces(&self) -> Vec<NetworkInterfaceInfo> {
        let lines = self.runner.run(&cmd::adapter_statistics()).await;
        let interfaces = parse_counter_csv(&lines, "Name", "SentBytes", "ReceivedBytes");
        if !interfaces.is_empty() {
            return interfaces;
        }

        debug!("Falling back to WMI interface counters");
        let lines = self.runner.run(&cmd::interface_counters()).await;
        parse_counter_csv(&lines, "Name", "BytesSentPersec", "BytesReceivedPersec")
    }

    async fn list_services(&self) -> Vec<ServiceInfo> {
        let lines = self.runner.run(&cmd::sockets()).await;

        let mut listening = Vec::new();
        let mut seen: HashSet<(String, String, String)> = HashSet::new();
        for row in lines.iter().filter_map(|line| parse_socket_row(line)) {
            if row.state != "LISTENING" {
                continue;
            }
            let Some((host, port)) = parse_address(row.local) else {
                continue;
            };
            let port = port.to_string();
            if !is_valid_port(&port) {
                continue;
            }
            let address = normalize_bind_address(&host);
            if seen.insert((address.clone(), port.clone(), row.pid.to_string())) {
                listening.push((address, port, row.pid.to_string()));
            }
        }
        if listening.is_empty() {
            return Vec::new();
        }

        let mut peers = PeerTally::new();
        for row in established_rows(&lines) {
            if let (Some((_, local_port)), Some((remote_ip, _))) =
                (parse_address(row.local), parse_address(row.remote))
            {
                peers.record(&local_port.to_string(), &remote_ip);
            }
        }

        let names = self.process_names().await;

        let mut services = Vec::with_capacity(listening.len());
        for (address, port, pid) in listening {
            let usage = self.resource_usage(&pid).await;
            let counts = peers.counts(&port);
            let name = process_name(&names, &pid);
            services.push(ServiceInfo::listening(pid, name, address, port, counts, usage));
        }
        services
    }

    async fn list_connections(&self) -> Vec<ConnectionInfo> {
        let lines = self.runner.run(&cmd::sockets()).await;
        established_rows(&lines)
            .filter_map(|row| parse_address(row.remote))
            .filter(|(remote_ip, _)| !is_loopback_remote(remote_ip))
            .map(|(remote_ip, remote_port)| {
                ConnectionInfo::established(remote_ip, remote_port.to_string())
            })
            .collect()
    }

    async fn list_processes(&self) -> Vec<ProcessInfo> {
        let lines = self.runner.run(&cmd::sockets()).await;

        let mut tally = PeerTally::new();
        for row in established_rows(&lines) {
            if let Some((remote_ip, _)) = parse_address(row.remote) {
                tally.record(row.pid, &remote_ip);
            }
        }
        if tally.is_empty() {
            return Vec::new();
        }

        let names = self.process_names().await;

        let mut processes = Vec::new();
        for (pid, counts) in tally.into_counts() {
            let usage = self.resource_usage(&pid).await;
            let name = process_name(&names, &pid);
            processes.push(ProcessInfo::networked(pid, name, counts, usage));
        }
        processes
    }

    async fn resource_usage(&self, pid: &str) -> ResourceUsage {
        if !is_valid_pid(pid) {
            debug!(pid, "Rejected invalid pid");
            return ResourceUsage::ZERO;
        }

        let (cpu_seconds, working_set) =
            parse_process_stats(&self.runner.run(&cmd::process_stats(pid)).await);
        let total_memory = self.total_memory().await;

        let cpu = cpu_seconds.map_or(0.0, |seconds| seconds / CPU_SECONDS_DIVISOR);
        let mem = match (working_set, total_memory) {
            (Some(used), Some(total)) if total > 0.0 => used / total * 100.0,
            _ => 0.0,
        };
        ResourceUsage::new(cpu, mem)
    }
}
