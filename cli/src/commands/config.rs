//! Config command - show and edit `~/.tmd-top/config.json`.

use anyhow::Result;
use tmdtop_core::{Config, ConfigStore, Platform};

pub async fn show(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    print!("{}", describe(&config, store));
    Ok(())
}

fn describe(config: &Config, store: &ConfigStore) -> String {
    let update_count = config
        .update_count
        .map_or_else(|| "unlimited".to_string(), |c| c.to_string());
    let platform = config
        .platform
        .map_or_else(|| format!("auto ({})", Platform::current()), |p| p.to_string());

    format!(
        "Config file: {}\n\nRefresh interval: {}s\nUpdate count: {}\nLAN label: {}\nPlatform: {}\n",
        store.path().display(),
        config.refresh_interval,
        update_count,
        config.lan_label,
        platform
    )
}

pub async fn set_interval(store: &ConfigStore, seconds: u64) -> Result<()> {
    store.set_refresh_interval(seconds).await?;
    println!("Refresh interval set to {}s", seconds);
    Ok(())
}

pub async fn set_count(store: &ConfigStore, count: Option<u64>) -> Result<()> {
    store.set_update_count(count).await?;
    match count {
        Some(count) => println!("Update count set to {}", count),
        None => println!("Update count cleared"),
    }
    Ok(())
}

pub async fn set_lan_label(store: &ConfigStore, label: &str) -> Result<()> {
    store.set_lan_label(label).await?;
    println!("LAN label set to '{}'", label.trim());
    Ok(())
}

pub async fn set_platform(store: &ConfigStore, platform: Option<&str>) -> Result<()> {
    let platform = match platform {
        Some("auto") | None => None,
        Some(name) => Some(name.parse::<Platform>()?),
    };
    store.set_platform(platform).await?;
    match platform {
        Some(platform) => println!("Platform forced to {}", platform),
        None => println!("Platform detection restored"),
    }
    Ok(())
}
