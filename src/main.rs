//! freightdesk - Terminal Trade Desk
//!
//! A terminal dashboard for logistics and trade management. Shipments
//! and trade partners are listed in tables and created through guided
//! multi-step wizards; records live behind a pluggable backend gateway.

use std::io;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

mod application;
mod domain;
mod infrastructure;
mod presentation;

use application::{App, AppMode};
use infrastructure::{HttpGateway, InMemoryGateway, TradeApi};
use presentation::{render_ui, InputHandler};

/// Entry point for the freightdesk terminal application.
///
/// Picks the backend (remote when `FREIGHTDESK_API` is set, the built-in
/// sample backend otherwise), sets up the terminal interface, and runs
/// the main event loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup fails or if there are issues
/// with the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api: Box<dyn TradeApi> = match std::env::var("FREIGHTDESK_API") {
        Ok(base_url) if !base_url.trim().is_empty() => Box::new(HttpGateway::new(&base_url)),
        _ => Box::new(InMemoryGateway::with_sample_data()),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Handles terminal rendering and keyboard input processing.
/// Continues running until the user presses 'q' on the dashboard.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                if key.code == KeyCode::Char('q') && matches!(app.mode, AppMode::Dashboard) {
                    return Ok(());
                }
                InputHandler::handle_key_event(app, key.code, key.modifiers);
            }
        }
    }
}
