//! TUI application state.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tmdtop_core::Platform;

use crate::view::{Snapshot, View};

pub struct App {
    pub view: View,
    pub platform: Platform,
    pub snapshot: Option<Snapshot>,
    pub updated_at: Option<String>,
    pub updates: u64,
    pub selected: usize,
    pub should_quit: bool,
    refresh_requested: bool,
}

impl App {
    pub fn new(view: View, platform: Platform) -> Self {
        Self {
            view,
            platform,
            snapshot: None,
            updated_at: None,
            updates: 0,
            selected: 0,
            should_quit: false,
            refresh_requested: true,
        }
    }

    /// Rows of the current snapshot, or none before the first update.
    pub fn row_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, Snapshot::len)
    }

    /// Store a fresh snapshot and count the update.
    pub fn apply(&mut self, snapshot: Snapshot, timestamp: String) {
        self.view = snapshot.view();
        self.snapshot = Some(snapshot);
        self.updated_at = Some(timestamp);
        self.updates += 1;
        self.selected = self.selected.min(self.row_count().saturating_sub(1));
    }

    /// Whether a refresh was asked for since the last call.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    fn switch_to(&mut self, view: View) {
        if view != self.view {
            self.view = view;
            self.snapshot = None;
            self.selected = 0;
            self.request_refresh();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Tab => self.switch_to(self.view.next()),
            KeyCode::Char(digit @ '1'..='4') => {
                let index = digit as usize - '1' as usize;
                self.switch_to(View::ALL[index]);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.row_count() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmdtop_core::NetworkInterfaceInfo;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_rows(rows: usize) -> App {
        let mut app = App::new(View::Netcard, Platform::Linux);
        let interfaces = (0..rows)
            .map(|i| NetworkInterfaceInfo::new(format!("eth{}", i), 0, 0))
            .collect();
        app.apply(Snapshot::Netcard(interfaces), "now".to_string());
        app
    }

    #[test]
    fn test_quit_keys() {
        for key in [
            press(KeyCode::Char('q')),
            press(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = App::new(View::Services, Platform::Linux);
            app.handle_key(key);
            assert!(app.should_quit);
        }

        let mut app = App::new(View::Services, Platform::Linux);
        app.handle_key(press(KeyCode::Char('c')));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_refresh_request() {
        let mut app = App::new(View::Services, Platform::Linux);
        assert!(app.take_refresh_request());
        assert!(!app.take_refresh_request());

        app.handle_key(press(KeyCode::Char('r')));
        assert!(app.take_refresh_request());
    }

    #[test]
    fn test_view_switching_requests_refresh() {
        let mut app = app_with_rows(2);
        app.take_refresh_request();

        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.view, View::Services);
        assert!(app.snapshot.is_none());
        assert!(app.take_refresh_request());

        app.handle_key(press(KeyCode::Char('4')));
        assert_eq!(app.view, View::Processes);

        // Same view: nothing to do
        app.take_refresh_request();
        app.handle_key(press(KeyCode::Char('4')));
        assert!(!app.take_refresh_request());
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = app_with_rows(2);
        app.handle_key(press(KeyCode::Up));
        assert_eq!(app.selected, 0);

        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Char('j')));
        assert_eq!(app.selected, 1);

        app.apply(Snapshot::Netcard(Vec::new()), "later".to_string());
        assert_eq!(app.selected, 0);
        assert_eq!(app.updates, 2);
    }
}
