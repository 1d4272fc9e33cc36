//! Platform telemetry adapters.
//!
//! One adapter per OS family. All three compile on every host since they only
//! spawn commands and parse text; [`PlatformAdapter`] picks one at
//! construction and forwards every query to it.

mod darwin;
mod linux;
mod utils;
mod windows;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::adapters::SystemRunner;
use crate::domain::{ConnectionInfo, NetworkInterfaceInfo, ProcessInfo, ResourceUsage, ServiceInfo};
use crate::error::Error;
use crate::ports::{CommandRunner, TelemetryPort};

pub use darwin::DarwinAdapter;
pub use linux::LinuxAdapter;
pub use utils::{is_valid_pid, is_valid_port, MAX_PID};
pub use windows::WindowsAdapter;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The family of the running host. Unknown systems are treated as Linux.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    fn from_os(os: &str) -> Self {
        match os {
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" | "mac" => Ok(Self::MacOs),
            "windows" | "win" => Ok(Self::Windows),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// The adapter for one platform, chosen once.
pub enum PlatformAdapter<R = SystemRunner> {
    Linux(LinuxAdapter<R>),
    MacOs(DarwinAdapter<R>),
    Windows(WindowsAdapter<R>),
}

impl PlatformAdapter {
    /// Adapter for the running host.
    pub fn detect() -> Self {
        Self::for_platform(Platform::current(), SystemRunner::new())
    }
}

impl<R: CommandRunner> PlatformAdapter<R> {
    pub fn for_platform(platform: Platform, runner: R) -> Self {
        match platform {
            Platform::Linux => Self::Linux(LinuxAdapter::with_runner(runner)),
            Platform::MacOs => Self::MacOs(DarwinAdapter::with_runner(runner)),
            Platform::Windows => Self::Windows(WindowsAdapter::with_runner(runner)),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            Self::Linux(_) => Platform::Linux,
            Self::MacOs(_) => Platform::MacOs,
            Self::Windows(_) => Platform::Windows,
        }
    }
}

impl<R: CommandRunner> TelemetryPort for PlatformAdapter<R> {
    async fn list_interfaces(&self) -> Vec<NetworkInterfaceInfo> {
        match self {
            Self::Linux(adapter) => adapter.list_interfaces().await,
            Self::MacOs(adapter) => adapter.list_interfaces().await,
            Self::Windows(adapter) => adapter.list_interfaces().await,
        }
    }

    async fn list_services(&self) -> Vec<ServiceInfo> {
        match self {
            Self::Linux(adapter) => adapter.list_services().await,
            Self::MacOs(adapter) => adapter.list_services().await,
            Self::Windows(adapter) => adapter.list_services().await,
        }
    }

    async fn list_connections(&self) -> Vec<ConnectionInfo> {
        match self {
            Self::Linux(adapter) => adapter.list_connections().await,
            Self::MacOs(adapter) => adapter.list_connections().await,
            Self::Windows(adapter) => adapter.list_connections().await,
        }
    }

    async fn list_processes(&self) -> Vec<ProcessInfo> {
        match self {
            Self::Linux(adapter) => adapter.list_processes().await,
            Self::MacOs(adapter) => adapter.list_processes().await,
            Self::Windows(adapter) => adapter.list_processes().await,
        }
    }

    async fn resource_usage(&self, pid: &str) -> ResourceUsage {
        match self {
            Self::Linux(adapter) => adapter.resource_usage(pid).await,
            Self::MacOs(adapter) => adapter.resource_usage(pid).await,
            Self::Windows(adapter) => adapter.resource_usage(pid).await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ScriptedRunner;

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("freebsd"), Platform::Linux);
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("Darwin".parse::<Platform>().unwrap(), Platform::MacOs);
        assert_eq!("win".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!(" linux ".parse::<Platform>().unwrap(), Platform::Linux);
        assert!(matches!(
            "plan9".parse::<Platform>(),
            Err(Error::UnsupportedPlatform(name)) if name == "plan9"
        ));
    }

    #[test]
    fn test_platform_serde() {
        assert_eq!(serde_json::to_string(&Platform::MacOs).unwrap(), "\"macos\"");
        let parsed: Platform = serde_json::from_str("\"windows\"").unwrap();
        assert_eq!(parsed, Platform::Windows);
    }

    #[tokio::test]
    async fn test_dispatches_to_chosen_platform() {
        let runner = ScriptedRunner::new().with(
            commands::windows::sockets(),
            "  TCP    10.0.0.5:49800    140.82.112.3:443    ESTABLISHED    7788",
        );
        let adapter = PlatformAdapter::for_platform(Platform::Windows, runner);
        assert_eq!(adapter.platform(), Platform::Windows);

        let connections = adapter.list_connections().await;
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].remote_ip, "140.82.112.3");
    }

    #[tokio::test]
    async fn test_every_platform_excludes_loopback() {
        let linux = ScriptedRunner::new().with(
            commands::linux::established(),
            "tcp 0 0 127.0.0.1:5432 127.0.0.1:39000 ESTABLISHED",
        );
        let darwin = ScriptedRunner::new().with(
            commands::darwin::sockets(),
            "tcp4 0 0 127.0.0.1.5432 127.0.0.1.60001 ESTABLISHED 1 1 300 0",
        );
        let windows = ScriptedRunner::new().with(
            commands::windows::sockets(),
            "TCP 127.0.0.1:3000 127.0.0.1:49900 ESTABLISHED 5432",
        );

        let adapters = [
            PlatformAdapter::for_platform(Platform::Linux, linux),
            PlatformAdapter::for_platform(Platform::MacOs, darwin),
            PlatformAdapter::for_platform(Platform::Windows, windows),
        ];
        for adapter in &adapters {
            assert!(adapter.list_connections().await.is_empty(), "{}", adapter.platform());
        }
    }
}
