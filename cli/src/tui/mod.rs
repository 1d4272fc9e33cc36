//! Full-screen refreshing table.

mod app;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::commands::table::Refresh;
use crate::commands::Context;
use crate::view::{Snapshot, View};

use self::app::App;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Run the TUI until the user quits or the update count is reached.
pub async fn run(view: View, refresh: Refresh, ctx: &Context) -> Result<()> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;

    let result = match Terminal::new(CrosstermBackend::new(io::stdout())) {
        Ok(mut terminal) => event_loop(&mut terminal, view, refresh, ctx).await,
        Err(e) => Err(e.into()),
    };

    // Restore terminal regardless of success/failure.
    let _ = disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);

    result
}

async fn event_loop(terminal: &mut Term, view: View, refresh: Refresh, ctx: &Context) -> Result<()> {
    let mut app = App::new(view, ctx.monitor.platform());
    let mut next_refresh = Instant::now();

    loop {
        let due = Instant::now() >= next_refresh;
        // The last counted update stays on screen for one interval
        if due && refresh.is_done(app.updates) {
            return Ok(());
        }

        if app.take_refresh_request() || due {
            terminal.draw(|f| ui::draw(f, &app))?;
            let snapshot = Snapshot::collect(app.view, &ctx.monitor, &ctx.locator).await;
            app.apply(snapshot, chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
            next_refresh = Instant::now() + refresh.interval;
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        let timeout = next_refresh
            .saturating_duration_since(Instant::now())
            .min(Duration::from_millis(250));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
