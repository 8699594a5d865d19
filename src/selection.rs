use std::collections::HashSet;
use std::env;

use crate::history::HistoryData;

pub const DEFAULT_DATE_COUNT: usize = 5;
pub const DEFAULT_STATE_COUNT: usize = 10;
pub const DEFAULT_STATES_PER_PAGE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Prep,
    Castle,
    MatchOccurred,
}

/// Optional per-render outcome filters. `None` means the filter is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeFilters {
    pub prep: Option<bool>,
    pub castle: Option<bool>,
    pub had_match: Option<bool>,
}

impl OutcomeFilters {
    pub fn any(&self) -> bool {
        self.prep.is_some() || self.castle.is_some() || self.had_match.is_some()
    }

    pub fn get(&self, kind: FilterKind) -> Option<bool> {
        match kind {
            FilterKind::Prep => self.prep,
            FilterKind::Castle => self.castle,
            FilterKind::MatchOccurred => self.had_match,
        }
    }

    pub fn set(&mut self, kind: FilterKind, value: Option<bool>) {
        match kind {
            FilterKind::Prep => self.prep = value,
            FilterKind::Castle => self.castle = value,
            FilterKind::MatchOccurred => self.had_match = value,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub states: HashSet<String>,
    /// Insertion order, i.e. the order the user ticked dates. The table
    /// reorders chronologically at render time.
    pub dates: Vec<String>,
    pub filters: OutcomeFilters,
}

impl SelectionState {
    pub fn toggle_state(&mut self, id: &str, included: bool) {
        if included {
            self.states.insert(id.to_string());
        } else {
            self.states.remove(id);
        }
    }

    pub fn toggle_date(&mut self, id: &str, included: bool) {
        if included {
            if !self.dates.iter().any(|d| d == id) {
                self.dates.push(id.to_string());
            }
        } else {
            self.dates.retain(|d| d != id);
        }
    }

    pub fn select_all_states(&mut self, data: &HistoryData) {
        self.states = data.states.iter().cloned().collect();
    }

    pub fn clear_states(&mut self) {
        self.states.clear();
    }

    pub fn select_all_dates(&mut self, data: &HistoryData) {
        self.dates = data.all_dates.clone();
    }

    pub fn clear_dates(&mut self) {
        self.dates.clear();
    }

    pub fn set_filter(&mut self, kind: FilterKind, value: Option<bool>) {
        self.filters.set(kind, value);
    }

    pub fn clear_filters(&mut self) {
        self.filters = OutcomeFilters::default();
    }

    /// Outcome filters only make sense against a single date; with more
    /// than one selected their values are ignored.
    pub fn filters_active(&self) -> bool {
        self.dates.len() == 1
    }

    /// Seeds the initial selection: the chronologically latest five
    /// dates and the first ten states. Runs once, before the first
    /// render.
    pub fn seed_defaults(&mut self, data: &HistoryData) {
        let skip = data.all_dates.len().saturating_sub(DEFAULT_DATE_COUNT);
        self.dates = data.all_dates[skip..].to_vec();
        self.states = data
            .states
            .iter()
            .take(DEFAULT_STATE_COUNT)
            .cloned()
            .collect();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_STATES_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn from_env() -> Self {
        let per_page = env::var("SVS_STATES_PER_PAGE")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_STATES_PER_PAGE)
            .max(1);
        Self { page: 1, per_page }
    }

    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.per_page).max(1)
    }

    pub fn first(&mut self) {
        self.page = 1;
    }

    pub fn prev(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn next(&mut self, total_rows: usize) {
        if self.page < self.total_pages(total_rows) {
            self.page += 1;
        }
    }

    pub fn last(&mut self, total_rows: usize) {
        self.page = self.total_pages(total_rows);
    }

    pub fn clamp(&mut self, total_rows: usize) {
        self.page = self.page.clamp(1, self.total_pages(total_rows));
    }
}
