//! Classification of remote addresses by routing scope.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};

/// Routing scope of an IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpScope {
    /// 127.0.0.0/8, ::1
    Loopback,
    /// RFC 1918 ranges and IPv6 unique local addresses.
    Private,
    /// 169.254.0.0/16, fe80::/10
    LinkLocal,
    /// Unspecified, "this network", multicast and the 240/4 block.
    Reserved,
    /// Anything routable on the public internet.
    Public,
    /// Not an IP address.
    Invalid,
}

/// Classify a textual IP address.
///
/// Tolerates the decorations platform tools put around addresses: IPv6
/// brackets, zone suffixes (`fe80::1%en0`) and IPv4-mapped IPv6 forms.
pub fn classify_ip(ip: &str) -> IpScope {
    let trimmed = ip.trim().trim_start_matches('[').trim_end_matches(']');
    let without_zone = trimmed.split('%').next().unwrap_or(trimmed);

    match without_zone.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => classify_v4(v4),
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => classify_v4(v4),
            None => classify_v6(v6),
        },
        Err(_) => IpScope::Invalid,
    }
}

/// True unless the address is a public, routable address.
pub fn is_private_ip(ip: &str) -> bool {
    classify_ip(ip) != IpScope::Public
}

fn classify_v4(ip: Ipv4Addr) -> IpScope {
    let first = ip.octets()[0];
    if ip.is_loopback() {
        IpScope::Loopback
    } else if ip.is_private() {
        IpScope::Private
    } else if ip.is_link_local() {
        IpScope::LinkLocal
    } else if first == 0 || first >= 240 || ip.is_multicast() {
        IpScope::Reserved
    } else {
        IpScope::Public
    }
}

fn classify_v6(ip: Ipv6Addr) -> IpScope {
    let head = ip.segments()[0];
    if ip.is_loopback() {
        IpScope::Loopback
    } else if head & 0xfe00 == 0xfc00 {
        IpScope::Private
    } else if head & 0xffc0 == 0xfe80 {
        IpScope::LinkLocal
    } else if ip.is_unspecified() || ip.is_multicast() {
        IpScope::Reserved
    } else {
        IpScope::Public
    }
}
