//! Location labels for remote addresses.

use crate::domain::{classify_ip, IpScope, UNKNOWN_LOCATION};

/// Turns a remote IP into a human-readable location.
pub trait Locator: Send + Sync {
    fn locate(&self, ip: &str) -> String;
}

/// Labels addresses by routing scope.
///
/// No geolocation database is consulted, so every public address is
/// reported as unknown.
#[derive(Debug, Clone)]
pub struct ScopeLocator {
    lan_label: String,
}

impl ScopeLocator {
    pub fn new(lan_label: impl Into<String>) -> Self {
        Self {
            lan_label: lan_label.into(),
        }
    }
}

impl Default for ScopeLocator {
    fn default() -> Self {
        Self::new("LAN")
    }
}

impl Locator for ScopeLocator {
    fn locate(&self, ip: &str) -> String {
        match classify_ip(ip) {
            IpScope::Loopback => "local".to_string(),
            IpScope::Private | IpScope::LinkLocal => self.lan_label.clone(),
            IpScope::Reserved => "reserved".to_string(),
            IpScope::Public | IpScope::Invalid => UNKNOWN_LOCATION.to_string(),
        }
    }
}
