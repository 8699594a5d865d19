use std::collections::VecDeque;
use std::env;

use crate::history::{state_label, HistoryData, Normalized};
use crate::search;
use crate::selection::{FilterKind, Pagination, SelectionState};
use crate::table::{materialize, TableView};

const LOG_CAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    States,
    Dates,
    Table,
}

/// Everything the event handlers touch. Owned by the main loop and
/// passed by reference into every handler; there are no globals.
#[derive(Debug, Clone)]
pub struct AppState {
    pub history: HistoryData,
    pub loaded: bool,
    pub selection: SelectionState,
    pub paging: Pagination,
    pub focus: Panel,
    pub state_cursor: usize,
    pub date_cursor: usize,
    pub table_scroll: usize,
    pub state_search: String,
    pub date_search: String,
    pub search_active: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub debug: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let debug = env::var("SVS_DEBUG").is_ok_and(|val| val == "true");
        Self {
            history: HistoryData::default(),
            loaded: false,
            selection: SelectionState::default(),
            paging: Pagination::from_env(),
            focus: Panel::States,
            state_cursor: 0,
            date_cursor: 0,
            table_scroll: 0,
            state_search: String::new(),
            date_search: String::new(),
            search_active: false,
            logs: VecDeque::with_capacity(LOG_CAP),
            help_overlay: false,
            debug,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= LOG_CAP {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    pub fn debug_log(&mut self, line: impl Into<String>) {
        if self.debug {
            self.push_log(line);
        }
    }

    /// Installs a freshly normalized document and seeds the default
    /// selection. Called once, before the first draw.
    pub fn load(&mut self, normalized: Normalized) {
        let warnings = normalized.warnings;
        self.history = normalized.data;
        self.loaded = true;
        self.selection.seed_defaults(&self.history);
        for warning in warnings {
            self.push_log(format!("[WARN] {warning}"));
        }
        self.push_log(format!(
            "[INFO] Loaded {} states across {} dates",
            self.history.states.len(),
            self.history.all_dates.len()
        ));
    }

    pub fn load_failed(&mut self, err: &anyhow::Error) {
        self.push_log(format!("[ERROR] History load failed: {err:#}"));
    }

    /// State ids whose labels pass the states search term.
    pub fn visible_states(&self) -> Vec<String> {
        self.history
            .states
            .iter()
            .filter(|id| search::matches_label(&state_label(id), &self.state_search))
            .cloned()
            .collect()
    }

    pub fn visible_dates(&self) -> Vec<String> {
        self.history
            .all_dates
            .iter()
            .filter(|date| search::matches_label(date, &self.date_search))
            .cloned()
            .collect()
    }

    pub fn table(&self) -> TableView {
        materialize(&self.history, &self.selection, self.paging)
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Panel::States => Panel::Dates,
            Panel::Dates => Panel::Table,
            Panel::Table => Panel::States,
        };
        self.search_active = false;
    }

    pub fn select_next(&mut self) {
        match self.focus {
            Panel::States => {
                let total = self.visible_states().len();
                Self::step_cursor(&mut self.state_cursor, total, 1);
            }
            Panel::Dates => {
                let total = self.visible_dates().len();
                Self::step_cursor(&mut self.date_cursor, total, 1);
            }
            Panel::Table => self.table_scroll = self.table_scroll.saturating_add(1),
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Panel::States => {
                let total = self.visible_states().len();
                Self::step_cursor(&mut self.state_cursor, total, -1);
            }
            Panel::Dates => {
                let total = self.visible_dates().len();
                Self::step_cursor(&mut self.date_cursor, total, -1);
            }
            Panel::Table => self.table_scroll = self.table_scroll.saturating_sub(1),
        }
    }

    fn step_cursor(cursor: &mut usize, total: usize, dir: isize) {
        if total == 0 {
            *cursor = 0;
            return;
        }
        if dir > 0 {
            *cursor = (*cursor + 1) % total;
        } else if *cursor == 0 {
            *cursor = total - 1;
        } else {
            *cursor -= 1;
        }
    }

    /// Flips the checkbox under the cursor in the focused panel.
    pub fn toggle_current(&mut self) {
        match self.focus {
            Panel::States => {
                let visible = self.visible_states();
                let Some(id) = visible.get(self.state_cursor).cloned() else {
                    return;
                };
                let included = !self.selection.states.contains(&id);
                self.selection.toggle_state(&id, included);
                self.debug_log(format!("[DEBUG] State {id} selected: {included}"));
            }
            Panel::Dates => {
                let visible = self.visible_dates();
                let Some(date) = visible.get(self.date_cursor).cloned() else {
                    return;
                };
                let included = !self.selection.dates.iter().any(|d| d == &date);
                self.selection.toggle_date(&date, included);
                self.debug_log(format!("[DEBUG] Date {date} selected: {included}"));
            }
            Panel::Table => {}
        }
        self.after_selection_change();
    }

    pub fn select_all_focused(&mut self) {
        match self.focus {
            Panel::States => self.selection.select_all_states(&self.history),
            Panel::Dates => self.selection.select_all_dates(&self.history),
            Panel::Table => return,
        }
        self.after_selection_change();
    }

    pub fn clear_focused(&mut self) {
        match self.focus {
            Panel::States => self.selection.clear_states(),
            Panel::Dates => self.selection.clear_dates(),
            Panel::Table => return,
        }
        self.after_selection_change();
    }

    /// Cycles one filter off -> yes -> no -> off. Values are held but
    /// ignored until exactly one date is selected.
    pub fn cycle_filter(&mut self, kind: FilterKind) {
        let next = match self.selection.filters.get(kind) {
            None => Some(true),
            Some(true) => Some(false),
            Some(false) => None,
        };
        self.selection.set_filter(kind, next);
        if !self.selection.filters_active() {
            self.push_log("[INFO] Filters apply once exactly one date is selected");
        }
        self.after_selection_change();
    }

    pub fn clear_filters(&mut self) {
        self.selection.clear_filters();
        self.after_selection_change();
    }

    pub fn page_first(&mut self) {
        self.paging.first();
        self.table_scroll = 0;
    }

    pub fn page_prev(&mut self) {
        self.paging.prev();
        self.table_scroll = 0;
    }

    pub fn page_next(&mut self) {
        let total = self.table().total_rows;
        self.paging.next(total);
        self.table_scroll = 0;
    }

    pub fn page_last(&mut self) {
        let total = self.table().total_rows;
        self.paging.last(total);
        self.table_scroll = 0;
    }

    pub fn search_push(&mut self, ch: char) {
        match self.focus {
            Panel::States => self.state_search.push(ch),
            Panel::Dates => self.date_search.push(ch),
            Panel::Table => {}
        }
        self.clamp_cursors();
    }

    pub fn search_pop(&mut self) {
        match self.focus {
            Panel::States => {
                self.state_search.pop();
            }
            Panel::Dates => {
                self.date_search.pop();
            }
            Panel::Table => {}
        }
        self.clamp_cursors();
    }

    fn after_selection_change(&mut self) {
        let total = self.table().total_rows;
        self.paging.clamp(total);
        self.table_scroll = 0;
    }

    fn clamp_cursors(&mut self) {
        let states = self.visible_states().len();
        let dates = self.visible_dates().len();
        self.state_cursor = self.state_cursor.min(states.saturating_sub(1));
        self.date_cursor = self.date_cursor.min(dates.saturating_sub(1));
    }
}
