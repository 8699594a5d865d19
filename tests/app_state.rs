use svs_terminal::history::{normalize, HistoryDoc};
use svs_terminal::state::{AppState, Panel};

fn loaded_state() -> AppState {
    let doc: HistoryDoc = serde_json::from_str(
        r#"{
            "svs-data-per-state": {
                "5": {"2024-01-01": {"won-prep": true, "won-castle": true}},
                "12": {"2024-02-01": {"won-prep": false, "won-castle": false}},
                "31": {}
            }
        }"#,
    )
    .expect("valid fixture json");
    let mut state = AppState::new();
    state.load(normalize(doc));
    state
}

#[test]
fn load_seeds_defaults_before_first_render() {
    let state = loaded_state();
    assert!(state.loaded);
    // Both dates (fewer than the 5-date quota) and all three states.
    assert_eq!(state.selection.dates.len(), 2);
    assert_eq!(state.selection.states.len(), 3);
    let view = state.table();
    assert_eq!(view.columns, vec!["2024-02-01", "2024-01-01"]);
    assert_eq!(view.rows.len(), 3);
}

#[test]
fn state_search_narrows_the_visible_checkbox_list() {
    let mut state = loaded_state();
    state.state_search = "state 1".to_string();
    assert_eq!(state.visible_states(), vec!["12"]);

    state.state_search = "1*2".to_string();
    assert_eq!(state.visible_states(), vec!["12"]);

    state.state_search.clear();
    assert_eq!(state.visible_states(), vec!["5", "12", "31"]);
}

#[test]
fn toggling_under_cursor_respects_the_search_window() {
    let mut state = loaded_state();
    state.focus = Panel::States;
    state.state_search = "state 3".to_string();
    state.state_cursor = 0;
    // Only "31" is visible, so the toggle must hit it, not "5".
    state.toggle_current();
    assert!(!state.selection.states.contains("31"));
    assert!(state.selection.states.contains("5"));
}

#[test]
fn clearing_dates_from_the_dates_panel_empties_the_table_body() {
    let mut state = loaded_state();
    state.focus = Panel::Dates;
    state.clear_focused();
    let view = state.table();
    assert!(view.columns.is_empty());
    assert!(view.rows.is_empty());
}

#[test]
fn log_ring_is_bounded() {
    let mut state = loaded_state();
    for n in 0..500 {
        state.push_log(format!("[INFO] line {n}"));
    }
    assert!(state.logs.len() <= 200);
    assert_eq!(state.logs.back().unwrap(), "[INFO] line 499");
}
