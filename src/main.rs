mod api;
mod app;
mod catalog;
mod config;
mod events;
mod flows;
mod logging;
mod models;
mod session;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use api::CravynClient;
use app::{App, Focus};
use events::AppEvent;
use session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config()?;
    logging::init(&config::get_log_path()?, &config.log_level)?;

    let client = CravynClient::from_config(&config)?;
    log::info!("Using recipe service at {}", client.base_url());

    let mut app = App::new(Session::from_config(&config));
    let catalog = app.session.catalog();
    log::info!(
        "Catalog has {} ingredients, {} diets, {} cuisines",
        catalog.ingredients.len(),
        catalog.diets.len(),
        catalog.cuisines.len()
    );

    // Create channel for async events
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    // Recent recipes load in the background while the UI starts
    flows::refresh_recent_recipes(&mut app.session, &client, &tx);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &client, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("Exiting after error: {err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Keys handled while the help popup is open. Returns true if the key was consumed.
fn handle_help_keys(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> bool {
    if !app.show_help {
        return false;
    }

    match key {
        KeyCode::Char('h') if modifiers.contains(KeyModifiers::CONTROL) => app.toggle_help(),
        KeyCode::Esc => app.show_help = false,
        _ => {}
    }
    true
}

fn handle_escape(app: &mut App) {
    if app.exit_pending {
        app.exit_pending = false;
    } else if !app.cancel_generation() {
        if app.session.show_suggestions() {
            app.session.close_suggestions();
        } else {
            app.session.dismiss_notice();
        }
    }
}

fn handle_keyboard_input(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    client: &CravynClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    match key {
        KeyCode::Char('c') if ctrl => {
            if app.exit_pending {
                app.quit();
            } else {
                app.exit_pending = true;
            }
            return None;
        }
        KeyCode::Esc => {
            handle_escape(app);
            return None;
        }
        _ if app.exit_pending => {
            // Any other key cancels pending exit
            app.exit_pending = false;
        }
        _ => {}
    }

    match key {
        KeyCode::Char('q') if ctrl => app.quit(),
        KeyCode::Char('h') if ctrl => app.toggle_help(),
        KeyCode::Char('g') if ctrl => {
            return flows::generate_recipe(&mut app.session, client, event_tx);
        }
        KeyCode::Char('s') if ctrl => {
            return flows::surprise_me(&mut app.session, client, event_tx);
        }
        KeyCode::Char('p') if ctrl => {
            return flows::generate_image(&mut app.session, client, event_tx);
        }

        KeyCode::Tab => app.next_focus(),
        KeyCode::BackTab => app.prev_focus(),

        KeyCode::Up | KeyCode::Left => app.move_cursor(false),
        KeyCode::Down | KeyCode::Right => app.move_cursor(true),
        KeyCode::PageUp => app.scroll_recipe_up(10),
        KeyCode::PageDown => app.scroll_recipe_down(10),

        KeyCode::Enter => app.confirm(),
        KeyCode::Delete => app.remove_focused(),
        KeyCode::Backspace if app.focus == Focus::Selected => app.remove_focused(),
        KeyCode::Backspace => app.backspace(),

        // Typing always goes to the search box
        KeyCode::Char(c) if !ctrl => app.type_char(c),

        _ => {}
    }
    None
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &CravynClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Apply finished requests before reading keys
        while let Ok(app_event) = event_rx.try_recv() {
            flows::handle_app_event(&mut app.session, app_event, client, event_tx);
        }

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && !handle_help_keys(app, key.code, key.modifiers)
                {
                    let handle = handle_keyboard_input(app, key.code, key.modifiers, client, event_tx);
                    app.track(handle);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
