pub mod widgets;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(0),    // Panels
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Bottom keymap bar
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search box
            Constraint::Length(5), // Quick add
            Constraint::Min(4),    // Selected
            Constraint::Length(4), // Preferences
        ])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(9)])
        .split(columns[1]);

    widgets::render_title(frame, rows[0]);
    widgets::render_search_input(frame, app, left[0]);
    widgets::render_quick_add(frame, app, left[1]);
    widgets::render_selected(frame, app, left[2]);
    widgets::render_preferences(frame, app, left[3]);
    widgets::render_recipe(frame, app, right[0]);
    widgets::render_recent(frame, app, right[1]);
    widgets::render_status_bar(frame, app, rows[2]);
    widgets::render_bottom_bar(frame, app, rows[3]);

    // The dropdown hangs below the search box, over the panels beneath it
    widgets::render_suggestions(frame, app, left[0]);

    if app.show_help {
        widgets::render_help_window(frame, frame.area());
    }
}
