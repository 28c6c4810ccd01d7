use chrono::Local;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::{NoticeLevel, Recipe};
use crate::session::Suggestion;

fn panel(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(Style::default().fg(color))
}

fn highlight(style: Style, active: bool) -> Style {
    if active {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

pub fn render_title(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            "Cravyn",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Cook What You Crave", Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), area);
}

pub fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let text = app.session.search_text();
    let (content, style) = if text.is_empty() {
        ("Type or search for ingredients...", Style::default().fg(Color::Gray))
    } else {
        (text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };

    let input = Paragraph::new(content)
        .style(style)
        .block(panel("Add your ingredients", app.focus == Focus::Search));

    frame.render_widget(input, area);
}

pub fn render_suggestions(frame: &mut Frame, app: &App, anchor: Rect) {
    let suggestions = app.visible_suggestions();
    if suggestions.is_empty() {
        return;
    }

    let lines: Vec<Line> = suggestions
        .iter()
        .enumerate()
        .map(|(i, suggestion)| {
            let active = i == app.suggestion_index;
            match suggestion {
                Suggestion::Catalog(name) => Line::from(Span::styled(
                    format!(" {name}"),
                    highlight(Style::default(), active),
                )),
                Suggestion::Custom(name) => Line::from(Span::styled(
                    format!(" Add \"{name}\""),
                    highlight(
                        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                        active,
                    ),
                )),
            }
        })
        .collect();

    #[allow(clippy::cast_possible_truncation)]
    let height = (lines.len() as u16 + 2).min(frame.area().height.saturating_sub(anchor.bottom()));
    let area = Rect {
        x: anchor.x,
        y: anchor.bottom(),
        width: anchor.width,
        height,
    };

    let dropdown = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(dropdown, area);
}

pub fn render_quick_add(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::QuickAdd;
    let mut spans = Vec::new();

    for (i, candidate) in app.session.quick_add_candidates().iter().enumerate() {
        let style = if candidate.selected {
            Style::default().fg(Color::DarkGray)
        } else if candidate.from_history {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Magenta)
        };
        let label = if candidate.from_history {
            format!("[* {}]", candidate.name)
        } else {
            format!("[{}]", candidate.name)
        };
        spans.push(Span::styled(
            label,
            highlight(style, focused && i == app.quick_add_index),
        ));
        spans.push(Span::raw(" "));
    }

    let quick_add = Paragraph::new(Line::from(spans))
        .block(panel("Quick add", focused))
        .wrap(Wrap { trim: false });

    frame.render_widget(quick_add, area);
}

pub fn render_selected(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Selected;
    let selected = app.session.selected();

    let content = if selected.is_empty() {
        Line::from(Span::styled(
            "Nothing selected yet",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = Vec::new();
        for (i, name) in selected.iter().enumerate() {
            spans.push(Span::styled(
                format!("[{name} x]"),
                highlight(
                    Style::default().fg(Color::LightRed),
                    focused && i == app.selected_index,
                ),
            ));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(content)
        .block(panel(
            &format!("Selected ingredients ({})", selected.len()),
            focused,
        ))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

pub fn render_preferences(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Diet | Focus::Cuisine);

    let row = |label: &'static str, value: &str, active: bool| {
        Line::from(vec![
            Span::raw(label),
            Span::styled(
                format!("< {value} >"),
                highlight(
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    active,
                ),
            ),
        ])
    };

    let lines = vec![
        row("Diet type: ", app.session.diet().label(), app.focus == Focus::Diet),
        row("Cuisine:   ", app.session.cuisine().label(), app.focus == Focus::Cuisine),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(panel("Preferences", focused)),
        area,
    );
}

fn detail_span(label: &str, value: Option<String>) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::styled(
            value.unwrap_or_else(|| "-".to_string()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
    ]
}

/// Lines for the recipe panel
#[allow(clippy::cast_precision_loss)]
pub fn recipe_lines(recipe: &Recipe, generating_image: bool) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            recipe.title.clone(),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if !recipe.description.is_empty() {
        lines.push(Line::from(recipe.description.clone()));
        lines.push(Line::from(""));
    }

    let mut details = Vec::new();
    details.extend(detail_span("Prep", recipe.prep_time.clone()));
    details.extend(detail_span("Cook", recipe.cook_time.clone()));
    details.extend(detail_span("Serves", recipe.servings.map(|s| s.to_string())));
    details.extend(detail_span("Cuisine", recipe.cuisine.clone()));
    lines.push(Line::from(details));

    let image_line = match recipe.image_size_bytes() {
        Some(bytes) => Span::styled(
            format!("Image attached ({:.1} KB)", bytes as f64 / 1024.0),
            Style::default().fg(Color::Green),
        ),
        None if generating_image => Span::styled(
            "Generating image...",
            Style::default().fg(Color::Yellow),
        ),
        None => Span::styled(
            "No image (Ctrl+P to generate one)",
            Style::default().fg(Color::DarkGray),
        ),
    };
    lines.push(Line::from(image_line));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "Ingredients",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    for ingredient in &recipe.ingredients {
        lines.push(Line::from(format!("  - {ingredient}")));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "Instructions",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    for (i, step) in recipe.instructions.iter().enumerate() {
        lines.push(Line::from(format!("  {}. {step}", i + 1)));
    }

    lines
}

pub fn render_recipe(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = panel("Recipe", false);

    let Some(recipe) = app.session.current_recipe() else {
        let text = if app.session.is_generating() {
            "Generating..."
        } else {
            "No recipe yet. Pick some ingredients and press Ctrl+G, or Ctrl+S for a surprise."
        };
        let placeholder = Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(placeholder, area);
        return;
    };

    let lines = recipe_lines(recipe, app.session.is_generating_image());

    // Clamp scrolling against the wrapped height, as the chat history does
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let total: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(inner_width))
        .sum();
    let visible = area.height.saturating_sub(2) as usize;
    let max_scroll = total.saturating_sub(visible);
    app.recipe_scroll = app.recipe_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(app.recipe_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(paragraph, area);
}

pub fn render_recent(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Recent;
    let recipes = app.session.recent_recipes();

    let lines: Vec<Line> = if recipes.is_empty() {
        vec![Line::from(Span::styled(
            "No recent recipes",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        recipes
            .iter()
            .enumerate()
            .map(|(i, recipe)| {
                let when = recipe
                    .created_at
                    .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                let cuisine = recipe.cuisine.as_deref().unwrap_or("");
                let image = if recipe.has_image() { "  [img]" } else { "" };
                Line::from(vec![
                    Span::styled(
                        recipe.title.clone(),
                        highlight(Style::default().fg(Color::White), focused && i == app.recent_index),
                    ),
                    Span::styled(
                        format!("  {cuisine}  {when}{image}"),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(panel("Recent recipes", focused)),
        area,
    );
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let busy = match (app.session.is_generating(), app.session.is_generating_image()) {
        (true, true) => " [Generating recipe and image...]",
        (true, false) => " [Generating recipe...]",
        (false, true) => " [Generating image...]",
        (false, false) => "",
    };

    let (text, color) = app.session.notice().map_or((String::new(), Color::Gray), |notice| {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Warning => Color::Yellow,
            NoticeLevel::Error => Color::Red,
        };
        (notice.text.clone(), color)
    });

    let status = Line::from(vec![
        Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(busy, Style::default().fg(Color::Yellow)),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Press Ctrl+C again to exit, Esc to cancel",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            "Ctrl+G: Generate | Ctrl+S: Surprise | Ctrl+P: Image | Tab: Focus | Ctrl+H: Help | Ctrl+C: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    let bar = Paragraph::new(text).alignment(Alignment::Center).style(style);

    frame.render_widget(bar, area);
}

pub fn render_help_window(frame: &mut Frame, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled(
            "Cravyn - Keyboard Shortcuts",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Recipes:", bold)),
        Line::from("  Ctrl+G        - Generate from selected ingredients"),
        Line::from("  Ctrl+S        - Surprise me"),
        Line::from("  Ctrl+P        - Generate an image for the recipe"),
        Line::from("  Esc           - Cancel a running request"),
        Line::from(""),
        Line::from(Span::styled("Ingredients:", bold)),
        Line::from("  Typing        - Search the catalog"),
        Line::from("  Up/Down       - Move through suggestions"),
        Line::from("  Enter         - Add suggestion or typed value"),
        Line::from("  Delete        - Remove focused selected ingredient"),
        Line::from(""),
        Line::from(Span::styled("Navigation:", bold)),
        Line::from("  Tab/Shift+Tab - Move between panels"),
        Line::from("  Left/Right    - Move within a panel, change preference"),
        Line::from("  PgUp/PgDn     - Scroll the recipe"),
        Line::from("  Ctrl+H        - Show/hide this help"),
        Line::from("  Ctrl+C        - Quit application"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    let popup_width = 60;
    let popup_height = 24;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help_paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        serde_json::from_value(serde_json::json!({
            "id": "r1",
            "title": "Lemon Garlic Chicken",
            "description": "Bright and simple",
            "ingredients": ["2 chicken breasts", "1 lemon"],
            "instructions": ["Marinate", "Roast"],
            "servings": 2
        }))
        .unwrap()
    }

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_recipe_lines_include_sections() {
        let text = text_of(&recipe_lines(&recipe(), false));
        assert_eq!(text[0], "Lemon Garlic Chicken");
        assert!(text.iter().any(|l| l == "  - 1 lemon"));
        assert!(text.iter().any(|l| l == "  2. Roast"));
        assert!(text.iter().any(|l| l.contains("Serves: 2")));
        assert!(text.iter().any(|l| l.contains("Prep: -")));
    }

    #[test]
    fn test_recipe_lines_image_state() {
        let mut r = recipe();
        let text = text_of(&recipe_lines(&r, true));
        assert!(text.iter().any(|l| l == "Generating image..."));

        r.image_base64 = Some("aGVsbG8=".to_string());
        let text = text_of(&recipe_lines(&r, false));
        assert!(text.iter().any(|l| l.starts_with("Image attached")));
    }
}
