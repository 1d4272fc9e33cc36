//! Table commands - netcard, services, connections, processes.

use std::time::Duration;

use anyhow::Result;

use crate::tui;
use crate::view::{Snapshot, View};

use super::Context;

/// How often and how many times to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh {
    pub interval: Duration,
    pub count: Option<u64>,
}

impl Refresh {
    /// Resolve `-i/--interval` and `-c/--count` against the config.
    ///
    /// `None` means one-shot. A bare `-i` uses the configured interval, and
    /// the configured update count applies only when no `-c` was given.
    pub fn resolve(
        interval: Option<Option<u64>>,
        count: Option<u64>,
        default_interval: u64,
        default_count: Option<u64>,
    ) -> Option<Self> {
        let seconds = interval?.unwrap_or(default_interval);
        Some(Self {
            interval: Duration::from_secs(seconds.max(1)),
            count: count.or(default_count),
        })
    }

    pub fn is_done(&self, updates: u64) -> bool {
        self.count.is_some_and(|count| updates >= count)
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn print_snapshot(snapshot: &Snapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", snapshot.to_json()?);
    } else {
        print!("{}", snapshot.render_plain(&timestamp()));
    }
    Ok(())
}

pub async fn run(view: View, refresh: Option<Refresh>, ctx: &Context) -> Result<()> {
    let Some(refresh) = refresh else {
        let snapshot = Snapshot::collect(view, &ctx.monitor, &ctx.locator).await;
        return print_snapshot(&snapshot, ctx.json);
    };

    if !ctx.json && !ctx.no_tui && atty::is(atty::Stream::Stdout) {
        return tui::run(view, refresh, ctx).await;
    }

    let mut updates = 0;
    loop {
        let snapshot = Snapshot::collect(view, &ctx.monitor, &ctx.locator).await;
        print_snapshot(&snapshot, ctx.json)?;

        updates += 1;
        if refresh.is_done(updates) {
            return Ok(());
        }

        if !ctx.json {
            println!();
        }
        tokio::time::sleep(refresh.interval).await;
    }
}
