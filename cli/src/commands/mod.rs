//! Subcommand implementations.

pub mod config;
pub mod table;
pub mod usage;

use tmdtop_core::{Config, NetworkMonitor, ScopeLocator};

/// Everything a command needs, resolved once at startup.
pub struct Context {
    pub monitor: NetworkMonitor,
    pub locator: ScopeLocator,
    pub config: Config,
    pub json: bool,
    pub no_tui: bool,
}

impl Context {
    pub fn new(config: Config, json: bool, no_tui: bool) -> Self {
        let monitor = match config.platform {
            Some(platform) => NetworkMonitor::for_platform(platform),
            None => NetworkMonitor::new(),
        };
        Self {
            monitor,
            locator: ScopeLocator::new(config.lan_label.clone()),
            config,
            json,
            no_tui,
        }
    }
}
