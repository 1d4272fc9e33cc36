//! Domain layer - Telemetry value types.
//!
//! Every type here is an immutable snapshot built fresh by each query.
//! None of them perform I/O, so they can be tested in isolation.

mod connection;
mod interface;
mod process;
mod row;
mod scope;
mod service;
mod usage;

pub use connection::{ConnectionInfo, UNKNOWN_LOCATION};
pub use interface::NetworkInterfaceInfo;
pub use process::{ProcessInfo, DEFAULT_REGION};
pub use scope::{classify_ip, is_private_ip, IpScope};
pub use service::{PeerCounts, ServiceInfo};
pub use usage::ResourceUsage;
