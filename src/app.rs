use tokio::task::JoinHandle;

use crate::session::{Session, Suggestion};

/// Panel that receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    QuickAdd,
    Selected,
    Diet,
    Cuisine,
    Recent,
}

impl Focus {
    const ORDER: [Self; 6] = [
        Self::Search,
        Self::QuickAdd,
        Self::Selected,
        Self::Diet,
        Self::Cuisine,
        Self::Recent,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub focus: Focus,
    pub should_quit: bool,
    pub show_help: bool,
    pub exit_pending: bool,
    pub suggestion_index: usize,
    pub quick_add_index: usize,
    pub selected_index: usize,
    pub recent_index: usize,
    pub recipe_scroll: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            focus: Focus::Search,
            should_quit: false,
            show_help: false,
            exit_pending: false,
            suggestion_index: 0,
            quick_add_index: 0,
            selected_index: 0,
            recent_index: 0,
            recipe_scroll: 0,
            tasks: Vec::new(),
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
        self.session.close_suggestions();
    }

    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
        self.session.close_suggestions();
    }

    /// Suggestions shown under the search box, empty when the dropdown is closed
    pub fn visible_suggestions(&self) -> Vec<Suggestion<'_>> {
        let text = self.session.search_text();
        if !self.session.show_suggestions() || text.is_empty() {
            return Vec::new();
        }
        self.session.suggestions(text).collect()
    }

    // Tasks

    /// Keep a handle so the task can be aborted on cancel
    pub fn track(&mut self, handle: Option<JoinHandle<()>>) {
        self.tasks.retain(|t| !t.is_finished());
        if let Some(handle) = handle {
            self.tasks.push(handle);
        }
    }

    /// Esc while something is generating
    pub fn cancel_generation(&mut self) -> bool {
        if !self.session.cancel_pending() {
            return false;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        true
    }

    // Editing

    pub fn type_char(&mut self, c: char) {
        self.focus = Focus::Search;
        let mut text = self.session.search_text().to_string();
        text.push(c);
        self.session.update_search_text(&text);
        self.suggestion_index = 0;
    }

    pub fn backspace(&mut self) {
        let mut text = self.session.search_text().to_string();
        text.pop();
        self.session.update_search_text(&text);
        self.suggestion_index = 0;
    }

    // Navigation

    pub fn move_cursor(&mut self, forward: bool) {
        match self.focus {
            Focus::Search => {
                let len = self.visible_suggestions().len();
                self.suggestion_index = step(self.suggestion_index, len, forward);
            }
            Focus::QuickAdd => {
                let len = self.session.quick_add_candidates().len();
                self.quick_add_index = step(self.quick_add_index, len, forward);
            }
            Focus::Selected => {
                let len = self.session.selected().len();
                self.selected_index = step(self.selected_index, len, forward);
            }
            Focus::Diet => self.session.cycle_diet(forward),
            Focus::Cuisine => self.session.cycle_cuisine(forward),
            Focus::Recent => {
                let len = self.session.recent_recipes().len();
                self.recent_index = step(self.recent_index, len, forward);
            }
        }
    }

    /// Enter on the focused panel
    pub fn confirm(&mut self) {
        match self.focus {
            Focus::Search => {
                let choice = self
                    .visible_suggestions()
                    .get(self.suggestion_index)
                    .map_or_else(
                        || self.session.search_text().to_string(),
                        |s| s.value().to_string(),
                    );
                self.session.add_ingredient(&choice);
                self.suggestion_index = 0;
            }
            Focus::QuickAdd => {
                let choice = self
                    .session
                    .quick_add_candidates()
                    .get(self.quick_add_index)
                    .filter(|c| !c.selected)
                    .map(|c| c.name.to_string());
                if let Some(name) = choice {
                    self.session.add_ingredient(&name);
                }
            }
            Focus::Selected => self.remove_focused(),
            Focus::Recent => {
                if self.session.select_recent(self.recent_index) {
                    self.recipe_scroll = 0;
                }
            }
            Focus::Diet | Focus::Cuisine => {}
        }
    }

    pub fn remove_focused(&mut self) {
        if self.focus != Focus::Selected {
            return;
        }
        let Some(name) = self.session.selected().get(self.selected_index).cloned() else {
            return;
        };
        self.session.remove_ingredient(&name);
        self.selected_index = self
            .selected_index
            .min(self.session.selected().len().saturating_sub(1));
    }

    pub const fn scroll_recipe_up(&mut self, amount: usize) {
        self.recipe_scroll = self.recipe_scroll.saturating_sub(amount);
    }

    pub const fn scroll_recipe_down(&mut self, amount: usize) {
        self.recipe_scroll = self.recipe_scroll.saturating_add(amount);
    }
}

/// Move a list cursor one step, wrapping at both ends
const fn step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}
