//! Usage command - CPU and memory of one pid.

use anyhow::{bail, Result};
use serde_json::json;
use tmdtop_core::adapters::telemetry::{is_valid_pid, MAX_PID};

use crate::format::format_percent;

use super::Context;

/// Accept pids in `1..=MAX_PID`, digits only.
fn check_pid(pid: &str) -> Result<()> {
    if !is_valid_pid(pid) || pid.bytes().all(|b| b == b'0') {
        bail!("Invalid pid '{}': expected a number from 1 to {}", pid, MAX_PID);
    }
    Ok(())
}

pub async fn run(pid: &str, ctx: &Context) -> Result<()> {
    check_pid(pid)?;

    let usage = ctx.monitor.resource_usage(pid).await;

    if ctx.json {
        let value = json!({
            "pid": pid,
            "cpu_percent": usage.cpu_percent,
            "mem_percent": usage.mem_percent,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "PID {}  CPU {}  MEM {}",
        pid,
        format_percent(usage.cpu_percent),
        format_percent(usage.mem_percent)
    );
    Ok(())
}
