//! Telemetry facade.

use tracing::debug;

use crate::adapters::{Platform, PlatformAdapter};
use crate::domain::{
    classify_ip, is_private_ip, ConnectionInfo, IpScope, NetworkInterfaceInfo, ProcessInfo,
    ResourceUsage, ServiceInfo,
};
use crate::ports::{CommandRunner, TelemetryPort};

use super::Locator;

/// Application service the presentation layer talks to.
///
/// Owns one telemetry adapter for its whole lifetime and forwards each query
/// to it unchanged. Every call is a fresh snapshot; nothing is cached.
pub struct NetworkMonitor<T = PlatformAdapter> {
    adapter: T,
}

impl NetworkMonitor {
    /// Monitor for the running host.
    pub fn new() -> Self {
        Self::with_adapter(PlatformAdapter::detect())
    }

    /// Monitor that uses the adapter for `platform`, whatever the host.
    pub fn for_platform(platform: Platform) -> Self {
        Self::with_adapter(PlatformAdapter::for_platform(platform, Default::default()))
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> NetworkMonitor<PlatformAdapter<R>> {
    pub fn platform(&self) -> Platform {
        self.adapter.platform()
    }
}

impl<T: TelemetryPort> NetworkMonitor<T> {
    /// Create a monitor around an existing adapter.
    pub fn with_adapter(adapter: T) -> Self {
        Self { adapter }
    }

    pub async fn list_interfaces(&self) -> Vec<NetworkInterfaceInfo> {
        let interfaces = self.adapter.list_interfaces().await;
        debug!(count = interfaces.len(), "Listed interfaces");
        interfaces
    }

    pub async fn list_services(&self) -> Vec<ServiceInfo> {
        let services = self.adapter.list_services().await;
        debug!(count = services.len(), "Listed services");
        services
    }

    pub async fn list_connections(&self) -> Vec<ConnectionInfo> {
        let connections = self.adapter.list_connections().await;
        debug!(count = connections.len(), "Listed connections");
        connections
    }

    /// Established connections with their location filled in by `locator`.
    pub async fn list_located_connections(&self, locator: &impl Locator) -> Vec<ConnectionInfo> {
        self.list_connections()
            .await
            .into_iter()
            .map(|connection| {
                let location = locator.locate(&connection.remote_ip);
                connection.with_location(location)
            })
            .collect()
    }

    pub async fn list_processes(&self) -> Vec<ProcessInfo> {
        let processes = self.adapter.list_processes().await;
        debug!(count = processes.len(), "Listed processes");
        processes
    }

    pub async fn resource_usage(&self, pid: &str) -> ResourceUsage {
        self.adapter.resource_usage(pid).await
    }

    /// True unless `ip` is a public, routable address.
    pub fn is_private_ip(&self, ip: &str) -> bool {
        is_private_ip(ip)
    }

    pub fn classify_ip(&self, ip: &str) -> IpScope {
        classify_ip(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::telemetry::commands;
    use crate::adapters::ScriptedRunner;
    use crate::application::ScopeLocator;

    /// Mock adapter for testing.
    struct MockTelemetry {
        services: Vec<ServiceInfo>,
    }

    impl TelemetryPort for MockTelemetry {
        async fn list_interfaces(&self) -> Vec<NetworkInterfaceInfo> {
            vec![NetworkInterfaceInfo::new("eth0", 1, 2)]
        }

        async fn list_services(&self) -> Vec<ServiceInfo> {
            self.services.clone()
        }

        async fn list_connections(&self) -> Vec<ConnectionInfo> {
            vec![
                ConnectionInfo::established("10.0.0.2", "22"),
                ConnectionInfo::established("8.8.8.8", "53"),
            ]
        }

        async fn list_processes(&self) -> Vec<ProcessInfo> {
            Vec::new()
        }

        async fn resource_usage(&self, pid: &str) -> ResourceUsage {
            if pid == "1" {
                ResourceUsage::new(1.0, 2.0)
            } else {
                ResourceUsage::ZERO
            }
        }
    }

    #[tokio::test]
    async fn test_forwards_queries() {
        let monitor = NetworkMonitor::with_adapter(MockTelemetry { services: Vec::new() });

        assert_eq!(monitor.list_interfaces().await.len(), 1);
        assert!(monitor.list_services().await.is_empty());
        assert!(monitor.list_processes().await.is_empty());
        assert_eq!(monitor.resource_usage("1").await, ResourceUsage::new(1.0, 2.0));
        assert_eq!(monitor.resource_usage("2").await, ResourceUsage::ZERO);
    }

    #[tokio::test]
    async fn test_located_connections() {
        let monitor = NetworkMonitor::with_adapter(MockTelemetry { services: Vec::new() });

        let connections = monitor
            .list_located_connections(&ScopeLocator::new("Home"))
            .await;
        let locations: Vec<&str> = connections.iter().map(|c| c.location.as_str()).collect();
        assert_eq!(locations, vec!["Home", "unknown"]);
    }

    #[test]
    fn test_ip_helpers() {
        let monitor = NetworkMonitor::with_adapter(MockTelemetry { services: Vec::new() });

        assert!(monitor.is_private_ip("192.168.0.1"));
        assert!(monitor.is_private_ip("::1"));
        assert!(!monitor.is_private_ip("1.1.1.1"));
        assert_eq!(monitor.classify_ip("[::ffff:10.0.0.1]"), IpScope::Private);
    }

    #[tokio::test]
    async fn test_platform_adapter_monitor() {
        let runner = ScriptedRunner::new().with(
            commands::darwin::ifconfig(),
            "lo0: flags=8049<UP,LOOPBACK> mtu 16384\nen0: flags=8863<UP> mtu 1500",
        );
        let monitor =
            NetworkMonitor::with_adapter(PlatformAdapter::for_platform(Platform::MacOs, runner));

        assert_eq!(monitor.platform(), Platform::MacOs);
        assert_eq!(
            monitor.list_interfaces().await,
            vec![NetworkInterfaceInfo::without_traffic("en0")]
        );
    }
}
