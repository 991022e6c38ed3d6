// src/tui/app.rs — TUI application state, event loop, and rendering.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};

use crate::controller::{Command, Snapshot};

use super::theme::Theme;
use super::widgets;

// ── App state ────────────────────────────────────────────────────

/// What a key press asks the loop to do.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    Send(Command),
}

#[derive(Default)]
struct App {
    snapshot: Snapshot,
    input: String,
    /// Rows scrolled up from the bottom of the transcript; 0 follows new messages.
    scroll_back: u16,
}

impl App {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if ctrl => Action::Quit,
            KeyCode::Char('r') if ctrl => Action::Send(Command::RefreshStats),
            KeyCode::Char('d') if ctrl => Action::Send(Command::DetectNow),
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Up => {
                self.scroll_back = self.scroll_back.saturating_add(1);
                Action::None
            }
            KeyCode::Down => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
                Action::None
            }
            KeyCode::PageUp => {
                self.scroll_back = self.scroll_back.saturating_add(10);
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(10);
                Action::None
            }
            KeyCode::End => {
                self.scroll_back = 0;
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Enter: blank input is left untouched, anything else is sent and cleared.
    fn submit(&mut self) -> Action {
        if self.input.trim().is_empty() {
            return Action::None;
        }
        let text = std::mem::take(&mut self.input);
        self.scroll_back = 0;
        Action::Send(Command::SendChat(text))
    }
}

// ── Public entry point ───────────────────────────────────────────

/// Run the full-screen client. Blocks until the user quits (Esc / Ctrl-C);
/// call it from a blocking thread, not from the async executor.
pub fn run_client_ui(
    commands: mpsc::Sender<Command>,
    mut snapshots: watch::Receiver<Snapshot>,
) -> anyhow::Result<()> {
    let mut app = App {
        snapshot: snapshots.borrow_and_update().clone(),
        ..App::default()
    };

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app, &commands, &mut snapshots);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    commands: &mpsc::Sender<Command>,
    snapshots: &mut watch::Receiver<Snapshot>,
) -> anyhow::Result<()> {
    loop {
        if snapshots.has_changed().unwrap_or(false) {
            app.snapshot = snapshots.borrow_and_update().clone();
        }

        terminal.draw(|f| render(f, app))?;

        // Poll for events (100ms timeout keeps controller updates flowing)
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match app.handle_key(key) {
                    Action::None => {}
                    Action::Quit => return Ok(()),
                    Action::Send(cmd) => {
                        if commands.blocking_send(cmd).is_err() {
                            anyhow::bail!("controller stopped unexpectedly");
                        }
                    }
                }
            }
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────

fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + feeling
            Constraint::Min(8),    // Transcript + chart
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer / key hints
        ])
        .split(size);

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);
    widgets::transcript::render(f, body[0], &app.snapshot.transcript, app.scroll_back);
    widgets::chart::render(f, body[1], &app.snapshot.distribution);

    render_input(f, chunks[2], app);
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let snap = &app.snapshot;
    let camera = match &snap.camera {
        Some(desc) => Span::styled(format!("camera: {desc}"), Theme::text_dim()),
        None => Span::styled("camera: unavailable", Theme::error()),
    };

    let mut spans = vec![
        Span::styled(
            snap.feeling_line(),
            Theme::feeling(snap.emotion.as_ref().map(|e| e.as_str())),
        ),
        Span::styled("   ", Theme::text_dim()),
        camera,
    ];
    if let Some(err) = &snap.last_error {
        spans.push(Span::styled(
            format!("   last error: {}", crate::util::truncate_str(err, 60)),
            Theme::error(),
        ));
    }

    let p = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled(" moodchat ", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );
    f.render_widget(p, area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Message ")
        .borders(Borders::ALL)
        .border_style(Theme::border_focus());

    let p = Paragraph::new(Line::from(vec![
        Span::styled(app.input.as_str(), Theme::text()),
        Span::styled("\u{2588}", Theme::text_dim()),
    ]))
    .block(block);
    f.render_widget(p, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(" Enter", Theme::key_hint()),
        Span::styled(" send  ", Theme::key_desc()),
        Span::styled("\u{2191}\u{2193}/PgUp/PgDn", Theme::key_hint()),
        Span::styled(" scroll  ", Theme::key_desc()),
        Span::styled("^D", Theme::key_hint()),
        Span::styled(" detect now  ", Theme::key_desc()),
        Span::styled("^R", Theme::key_hint()),
        Span::styled(" refresh chart  ", Theme::key_desc()),
        Span::styled("Esc", Theme::key_hint()),
        Span::styled(" quit", Theme::key_desc()),
    ]);

    f.render_widget(Paragraph::new(hints), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_then_enter_sends_and_clears() {
        let mut app = App::default();
        for c in "hello".chars() {
            assert_eq!(app.handle_key(press(KeyCode::Char(c))), Action::None);
        }
        assert_eq!(
            app.handle_key(press(KeyCode::Enter)),
            Action::Send(Command::SendChat("hello".into()))
        );
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_blank_enter_does_nothing() {
        let mut app = App::default();
        app.input = "   ".into();
        assert_eq!(app.handle_key(press(KeyCode::Enter)), Action::None);
        assert_eq!(app.input, "   ");
    }

    #[test]
    fn test_q_is_typed_not_quit() {
        let mut app = App::default();
        assert_eq!(app.handle_key(press(KeyCode::Char('q'))), Action::None);
        assert_eq!(app.input, "q");
        assert_eq!(app.handle_key(press(KeyCode::Esc)), Action::Quit);
        assert_eq!(app.handle_key(ctrl('c')), Action::Quit);
    }

    #[test]
    fn test_control_shortcuts() {
        let mut app = App::default();
        assert_eq!(app.handle_key(ctrl('d')), Action::Send(Command::DetectNow));
        assert_eq!(app.handle_key(ctrl('r')), Action::Send(Command::RefreshStats));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_scroll_resets_on_send() {
        let mut app = App::default();
        app.handle_key(press(KeyCode::PageUp));
        assert_eq!(app.scroll_back, 10);
        app.input = "hi".into();
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.scroll_back, 0);
    }
}
