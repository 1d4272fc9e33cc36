//! tmd-top CLI - Network and process monitor
//!
//! Shows network interfaces, listening services, established connections and
//! processes with network activity, once or as a refreshing table.

mod commands;
mod format;
mod logging;
mod tui;
mod view;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tmdtop_core::ConfigStore;

use commands::table::Refresh;
use commands::Context;
use view::View;

#[derive(Parser)]
#[command(name = "tmd-top")]
#[command(author, version, about = "Network and process monitor")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,
}

#[derive(Args, Debug, Clone, Copy)]
struct RefreshArgs {
    /// Refresh every N seconds (bare -i uses the configured interval)
    #[arg(short, long, value_name = "SECS", num_args = 0..=1,
          value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<Option<u64>>,

    /// Exit after N updates
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show network interfaces with traffic counters
    #[command(alias = "interfaces")]
    Netcard(RefreshArgs),

    /// Show listening services
    Services(RefreshArgs),

    /// Show established connections
    #[command(alias = "conns")]
    Connections(RefreshArgs),

    /// Show processes with established connections
    #[command(alias = "ps")]
    Processes(RefreshArgs),

    /// Show CPU and memory usage of a process
    Usage {
        /// Process id
        pid: String,
    },

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default refresh interval in seconds
    Interval {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        seconds: u64,
    },
    /// Set the default update count (omit to refresh forever)
    Count {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },
    /// Set the location label for private addresses
    LanLabel { label: String },
    /// Force a platform adapter: linux, macos, windows or auto
    Platform { name: Option<String> },
}

fn table_command(command: &Commands) -> Option<(View, RefreshArgs)> {
    match command {
        Commands::Netcard(args) => Some((View::Netcard, *args)),
        Commands::Services(args) => Some((View::Services, *args)),
        Commands::Connections(args) => Some((View::Connections, *args)),
        Commands::Processes(args) => Some((View::Processes, *args)),
        _ => None,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let interactive = !cli.json && !cli.no_tui && atty::is(atty::Stream::Stdout);
    let refreshing = match &cli.command {
        Some(command) => table_command(command).is_some_and(|(_, args)| args.interval.is_some()),
        None => true,
    };
    logging::init_logging(if interactive && refreshing { "off" } else { "warn" });

    let store = ConfigStore::new()?;

    match cli.command {
        Some(Commands::Config { action }) => match action {
            None | Some(ConfigAction::Show) => commands::config::show(&store, cli.json).await?,
            Some(ConfigAction::Interval { seconds }) => {
                commands::config::set_interval(&store, seconds).await?
            }
            Some(ConfigAction::Count { count }) => commands::config::set_count(&store, count).await?,
            Some(ConfigAction::LanLabel { label }) => {
                commands::config::set_lan_label(&store, &label).await?
            }
            Some(ConfigAction::Platform { name }) => {
                commands::config::set_platform(&store, name.as_deref()).await?
            }
        },
        Some(Commands::Usage { pid }) => {
            let ctx = Context::new(store.load().await?, cli.json, cli.no_tui);
            commands::usage::run(&pid, &ctx).await?;
        }
        Some(ref command) => {
            let config = store.load().await?;
            // Every remaining subcommand is a table
            if let Some((view, args)) = table_command(command) {
                let refresh = Refresh::resolve(
                    args.interval,
                    args.count,
                    config.refresh_interval,
                    config.update_count,
                );
                let ctx = Context::new(config, cli.json, cli.no_tui);
                commands::table::run(view, refresh, &ctx).await?;
            }
        }
        None => {
            // Default: refreshing services table, or a single snapshot when piped
            let config = store.load().await?;
            let refresh = interactive.then(|| {
                Refresh::resolve(Some(None), None, config.refresh_interval, config.update_count)
            });
            let ctx = Context::new(config, cli.json, cli.no_tui);
            commands::table::run(View::Services, refresh.flatten(), &ctx).await?;
        }
    }

    Ok(())
}
