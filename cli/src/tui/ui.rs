//! TUI rendering.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::format::truncate;
use crate::view::View;

use super::app::App;

const MAX_CELL: usize = 40;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_table(f, app, chunks[1]);
    draw_footer(f, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let title = match &app.updated_at {
        Some(at) => format!(
            "tmd-top | {} - {} | {} rows | {}",
            app.view.title(),
            at,
            app.row_count(),
            app.platform
        ),
        None => format!("tmd-top | {} | loading... | {}", app.view.title(), app.platform),
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(header, area);
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let headers = app.view.headers();
    let header_cells = headers
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Vec<String>> = app
        .snapshot
        .as_ref()
        .map(|snapshot| snapshot.rows())
        .unwrap_or_default();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count().min(MAX_CELL));
        }
    }

    let table_rows = rows.iter().enumerate().map(|(i, row)| {
        let cells = row.iter().map(|cell| Cell::from(truncate(cell, MAX_CELL)));
        let style = if i == app.selected {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };
        Row::new(cells).style(style)
    });

    let constraints = widths
        .iter()
        .map(|w| Constraint::Length(u16::try_from(*w).unwrap_or(u16::MAX)));

    let table = Table::new(table_rows, constraints)
        .header(header)
        .column_spacing(2)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", app.view.title())),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    if !rows.is_empty() {
        state.select(Some(app.selected));
    }

    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let views = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| format!("{}: {}", i + 1, view.title()))
        .collect::<Vec<_>>()
        .join(" | ");
    let help = format!("{} | tab: next | j/k: navigate | r: refresh | q: quit", views);

    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(footer, area);
}
