//! The four telemetry tables and their rendering.

use tmdtop_core::{
    ConnectionInfo, Locator, NetworkInterfaceInfo, NetworkMonitor, ProcessInfo, ServiceInfo,
};

use crate::format::{format_bytes, format_percent};

/// Which table is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Netcard,
    Services,
    Connections,
    Processes,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Netcard,
        View::Services,
        View::Connections,
        View::Processes,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Netcard => "Network Interfaces",
            View::Services => "Listening Services",
            View::Connections => "Connections",
            View::Processes => "Network Processes",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            View::Netcard => &["NAME", "SENT", "RECEIVED"],
            View::Services => &[
                "PID", "SERVICE", "ADDRESS", "PORT", "IPS", "CONNS", "UPLOAD", "DOWNLOAD", "CPU",
                "MEM",
            ],
            View::Connections => &["REMOTE IP", "PORT", "UPLOAD", "DOWNLOAD", "LOCATION"],
            View::Processes => &[
                "PID", "NAME", "IPS", "CONNS", "UPLOAD", "DOWNLOAD", "CPU", "REGION",
            ],
        }
    }

    pub fn next(self) -> View {
        match self {
            View::Netcard => View::Services,
            View::Services => View::Connections,
            View::Connections => View::Processes,
            View::Processes => View::Netcard,
        }
    }
}

/// One query result for a view.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Netcard(Vec<NetworkInterfaceInfo>),
    Services(Vec<ServiceInfo>),
    Connections(Vec<ConnectionInfo>),
    Processes(Vec<ProcessInfo>),
}

impl Snapshot {
    /// Query the monitor for `view`.
    pub async fn collect(view: View, monitor: &NetworkMonitor, locator: &impl Locator) -> Self {
        match view {
            View::Netcard => Snapshot::Netcard(monitor.list_interfaces().await),
            View::Services => Snapshot::Services(monitor.list_services().await),
            View::Connections => {
                Snapshot::Connections(monitor.list_located_connections(locator).await)
            }
            View::Processes => Snapshot::Processes(monitor.list_processes().await),
        }
    }

    pub fn view(&self) -> View {
        match self {
            Snapshot::Netcard(_) => View::Netcard,
            Snapshot::Services(_) => View::Services,
            Snapshot::Connections(_) => View::Connections,
            Snapshot::Processes(_) => View::Processes,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Snapshot::Netcard(items) => items.len(),
            Snapshot::Services(items) => items.len(),
            Snapshot::Connections(items) => items.len(),
            Snapshot::Processes(items) => items.len(),
        }
    }

    /// Cell text for every record, in header order.
    pub fn rows(&self) -> Vec<Vec<String>> {
        match self {
            Snapshot::Netcard(items) => items
                .iter()
                .map(|i| {
                    vec![
                        i.name.clone(),
                        format_bytes(i.bytes_sent),
                        format_bytes(i.bytes_received),
                    ]
                })
                .collect(),
            Snapshot::Services(items) => items
                .iter()
                .map(|s| {
                    vec![
                        s.pid.clone(),
                        s.service_name.clone(),
                        s.bind_address.clone(),
                        s.port.clone(),
                        s.distinct_remote_ip_count.to_string(),
                        s.connection_count.to_string(),
                        format_bytes(s.upload_bytes),
                        format_bytes(s.download_bytes),
                        format_percent(s.cpu_percent),
                        format_percent(s.mem_percent),
                    ]
                })
                .collect(),
            Snapshot::Connections(items) => items
                .iter()
                .map(|c| {
                    vec![
                        c.remote_ip.clone(),
                        c.remote_port.clone(),
                        format_bytes(c.upload_bytes),
                        format_bytes(c.download_bytes),
                        c.location.clone(),
                    ]
                })
                .collect(),
            Snapshot::Processes(items) => items
                .iter()
                .map(|p| {
                    vec![
                        p.pid.clone(),
                        p.name.clone(),
                        p.distinct_remote_ip_count.to_string(),
                        p.connection_count.to_string(),
                        format_bytes(p.upload_bytes),
                        format_bytes(p.download_bytes),
                        format_percent(p.cpu_percent),
                        p.region.clone(),
                    ]
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Snapshot::Netcard(items) => serde_json::to_string_pretty(items),
            Snapshot::Services(items) => serde_json::to_string_pretty(items),
            Snapshot::Connections(items) => serde_json::to_string_pretty(items),
            Snapshot::Processes(items) => serde_json::to_string_pretty(items),
        }
    }

    /// Plain-text table headed by `<title> - <timestamp>`.
    pub fn render_plain(&self, timestamp: &str) -> String {
        let view = self.view();
        let headers = view.headers();
        let rows = self.rows();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let format_line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let title = format!("{} - {}", view.title(), timestamp);
        let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let header_line = format_line(&header_cells);

        let mut out = String::new();
        out.push_str(&title);
        out.push('\n');
        out.push_str(&"=".repeat(title.chars().count()));
        out.push_str("\n\n");
        out.push_str(&header_line);
        out.push('\n');
        out.push_str(&"-".repeat(header_line.chars().count()));
        out.push('\n');

        if rows.is_empty() {
            out.push_str("No data.\n");
        } else {
            for row in &rows {
                out.push_str(&format_line(row));
                out.push('\n');
            }
        }
        out
    }
}
