//! TUI runtime for bugpatch

use crate::api::BackendClient;
use crate::app::messages::BackgroundMessage;
use crate::app::{actions, background, input, RuntimeContext};
use crate::ui;
use crate::ui::App;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::sync::mpsc;
use std::time::Duration;

/// Run the TUI. With `start_intake` set, the URL already in the app is
/// analyzed right away.
pub async fn run_tui(mut app: App, client: BackendClient, start_intake: bool) -> Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let ctx = RuntimeContext {
        client: &client,
        tx: &tx,
    };

    if start_intake {
        actions::start_intake(&mut app, &ctx);
    }

    let result = run_loop(&mut terminal, &mut app, rx, &ctx);

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

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<BackgroundMessage>,
    ctx: &RuntimeContext,
) -> Result<()> {
    loop {
        // Clear expired toasts and banners
        app.clear_expired_toast();

        // Advance spinner animation
        app.tick_loading();

        // Check for background messages (non-blocking)
        background::drain_messages(app, &rx);

        // Render
        terminal.draw(|f| ui::render(f, app))?;

        // Poll for events with fast timeout (snappy animations)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    input::handle_key_event(app, key, ctx)?;
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let screen = Rect::new(0, 0, size.width, size.height);
                    input::handle_mouse_event(app, mouse, screen);
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
