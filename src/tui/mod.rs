//! Interactive terminal UI over a [`DirectoryContext`].

mod app;
mod ui;

pub use app::App;

use crate::context::DirectoryContext;
use crate::storage::kv::KeyValueStore;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

/// Event loop tick; also bounds debounce latency
const TICK: Duration = Duration::from_millis(50);

pub fn run<S: KeyValueStore>(
    ctx: DirectoryContext<S>,
    location: String,
    initial_query: Option<String>,
) -> Result<()> {
    // App state first: the index starts loading while the terminal is set up
    let mut app = App::new(ctx, location)?;
    if let Some(query) = initial_query {
        let now = Instant::now();
        for c in query.chars() {
            app.push_char(c, now);
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Clear the terminal to prevent any artifacts from previous content
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if !event::poll(app.poll_timeout(Instant::now(), TICK))? {
            continue;
        }

        // Only handle key press events, not release or repeat
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let now = Instant::now();
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::CONTROL, KeyCode::Char('q')) => return Ok(()),
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => app.save_search(),
            (KeyModifiers::CONTROL, KeyCode::Char('o')) => app.cycle_sort(),
            (KeyModifiers::CONTROL, KeyCode::Char('t')) => app.cycle_min_rating(),
            (KeyModifiers::CONTROL, KeyCode::Char('x')) => app.clear_facets(),
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => app.delete_word(now),
            (KeyModifiers::CONTROL, KeyCode::Char('h')) => app.backspace(now),
            (KeyModifiers::CONTROL, KeyCode::Char('j'))
            | (KeyModifiers::CONTROL, KeyCode::Char('n')) => app.move_down(),
            (KeyModifiers::CONTROL, KeyCode::Char('k'))
            | (KeyModifiers::CONTROL, KeyCode::Char('p')) => app.move_up(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => app.escape(now),
                KeyCode::Enter => app.enter(),
                KeyCode::Down | KeyCode::Tab => app.move_down(),
                KeyCode::Up | KeyCode::BackTab => app.move_up(),
                KeyCode::Backspace => app.backspace(now),
                KeyCode::Char(c) => app.push_char(c, now),
                _ => {}
            },
            _ => {}
        }
    }
}
