use crate::history::{date_order, HistoryData, MatchRecord, Opponent, Outcome};
use crate::selection::{OutcomeFilters, Pagination, SelectionState};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No record at all for this state/date.
    NoData,
    /// A record exists but the state sat this date out.
    NoMatch,
    Played {
        prep: Outcome,
        castle: Outcome,
        opposition: Opponent,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub state: String,
    /// One cell per column, in column order.
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    /// Selected dates, chronologically descending so the most recent
    /// column sits next to the state column.
    pub columns: Vec<String>,
    /// Body rows for the current page only.
    pub rows: Vec<TableRow>,
    /// Row count before page slicing, for pagination bounds.
    pub total_rows: usize,
    pub total_pages: usize,
    pub page: usize,
}

/// Builds the visible table for the current page. Pure with respect to
/// its inputs; callers re-invoke it after every selection mutation.
pub fn materialize(
    data: &HistoryData,
    selection: &SelectionState,
    paging: Pagination,
) -> TableView {
    materialize_slice(data, selection, Some(paging))
}

/// Same as [`materialize`] but with every included row, for export.
pub fn materialize_all(data: &HistoryData, selection: &SelectionState) -> TableView {
    materialize_slice(data, selection, None)
}

fn materialize_slice(
    data: &HistoryData,
    selection: &SelectionState,
    paging: Option<Pagination>,
) -> TableView {
    let mut columns = selection.dates.clone();
    columns.sort_by(|a, b| date_order(b, a));

    let filtering = selection.filters_active() && selection.filters.any();
    let filter_date = selection.dates.first();

    let included: Vec<&String> = data
        .states
        .iter()
        .filter(|state| selection.states.contains(state.as_str()))
        .filter(|state| {
            if !filtering {
                return true;
            }
            let Some(date) = filter_date else {
                return true;
            };
            match data.record(state, date) {
                Some(record) => passes_filters(record, &selection.filters),
                // A state with no record for the filtered date never
                // matches a filtered view.
                None => false,
            }
        })
        .collect();

    let total_rows = included.len();
    let (page, total_pages, window) = match paging {
        Some(paging) => {
            let total_pages = paging.total_pages(total_rows);
            let page = paging.page.clamp(1, total_pages);
            let start = (page - 1) * paging.per_page;
            let end = (start + paging.per_page).min(total_rows);
            (page, total_pages, &included[start.min(total_rows)..end])
        }
        None => (1, 1, included.as_slice()),
    };

    // Header only when no dates are picked: no columns and no body rows.
    let rows = if columns.is_empty() {
        Vec::new()
    } else {
        window
            .iter()
            .map(|state| TableRow {
                state: (*state).clone(),
                cells: columns
                    .iter()
                    .map(|date| cell_for(data.record(state, date)))
                    .collect(),
            })
            .collect()
    };

    TableView {
        columns,
        rows,
        total_rows,
        total_pages,
        page,
    }
}

fn cell_for(record: Option<&MatchRecord>) -> Cell {
    match record {
        None => Cell::NoData,
        Some(record) if !record.played() => Cell::NoMatch,
        Some(record) => Cell::Played {
            prep: record.won_prep,
            castle: record.won_castle,
            opposition: record.opposition.clone(),
        },
    }
}

fn passes_filters(record: &MatchRecord, filters: &OutcomeFilters) -> bool {
    if let Some(want) = filters.had_match {
        if record.played() != want {
            return false;
        }
    }
    if let Some(want) = filters.prep {
        if !outcome_matches(record.won_prep, want) {
            return false;
        }
    }
    if let Some(want) = filters.castle {
        if !outcome_matches(record.won_castle, want) {
            return false;
        }
    }
    true
}

// An Unknown outcome matches neither filter polarity.
fn outcome_matches(outcome: Outcome, want: bool) -> bool {
    match outcome {
        Outcome::Won => want,
        Outcome::Lost => !want,
        Outcome::Unknown => false,
    }
}
