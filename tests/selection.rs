use svs_terminal::history::{normalize, HistoryDoc};
use svs_terminal::selection::{FilterKind, SelectionState};

fn data_with_dates(states: &[&str], dates: &[&str]) -> svs_terminal::history::HistoryData {
    let mut per_state = serde_json::Map::new();
    for state in states {
        let mut record_map = serde_json::Map::new();
        for date in dates {
            record_map.insert(
                (*date).to_string(),
                serde_json::json!({"won-prep": true, "won-castle": true}),
            );
        }
        per_state.insert((*state).to_string(), serde_json::Value::Object(record_map));
    }
    let doc: HistoryDoc =
        serde_json::from_value(serde_json::json!({"svs-data-per-state": per_state}))
            .expect("valid fixture json");
    normalize(doc).data
}

#[test]
fn toggle_state_round_trips() {
    let mut selection = SelectionState::default();
    assert!(!selection.states.contains("12"));
    selection.toggle_state("12", true);
    assert!(selection.states.contains("12"));
    selection.toggle_state("12", false);
    assert!(!selection.states.contains("12"));
}

#[test]
fn toggle_date_preserves_insertion_order() {
    let mut selection = SelectionState::default();
    selection.toggle_date("2024-06-01", true);
    selection.toggle_date("2024-01-01", true);
    selection.toggle_date("2024-03-01", true);
    // Re-adding an already selected date is a no-op.
    selection.toggle_date("2024-06-01", true);
    assert_eq!(
        selection.dates,
        vec!["2024-06-01", "2024-01-01", "2024-03-01"]
    );

    selection.toggle_date("2024-01-01", false);
    assert_eq!(selection.dates, vec!["2024-06-01", "2024-03-01"]);
}

#[test]
fn select_all_then_clear_dates_yields_empty() {
    let data = data_with_dates(&["1"], &["2024-01-01", "2024-02-01", "2024-03-01"]);
    let mut selection = SelectionState::default();
    selection.select_all_dates(&data);
    assert_eq!(selection.dates.len(), 3);
    selection.clear_dates();
    assert!(selection.dates.is_empty());
}

#[test]
fn defaults_seed_latest_five_dates_and_first_ten_states() {
    let states: Vec<String> = (1..=15).map(|n| n.to_string()).collect();
    let state_refs: Vec<&str> = states.iter().map(String::as_str).collect();
    let dates: Vec<String> = (1..=9).map(|n| format!("2024-0{n}-01")).collect();
    let date_refs: Vec<&str> = dates.iter().map(String::as_str).collect();
    let data = data_with_dates(&state_refs, &date_refs);

    let mut selection = SelectionState::default();
    selection.seed_defaults(&data);

    assert_eq!(
        selection.dates,
        vec![
            "2024-05-01",
            "2024-06-01",
            "2024-07-01",
            "2024-08-01",
            "2024-09-01"
        ]
    );
    assert_eq!(selection.states.len(), 10);
    for id in 1..=10 {
        assert!(selection.states.contains(&id.to_string()));
    }
    assert!(!selection.states.contains("11"));
}

#[test]
fn defaults_with_fewer_dates_than_the_quota() {
    let data = data_with_dates(&["1", "2"], &["2024-01-01", "2024-02-01"]);
    let mut selection = SelectionState::default();
    selection.seed_defaults(&data);
    assert_eq!(selection.dates, vec!["2024-01-01", "2024-02-01"]);
    assert_eq!(selection.states.len(), 2);
}

#[test]
fn filters_only_active_with_exactly_one_date() {
    let mut selection = SelectionState::default();
    selection.set_filter(FilterKind::Prep, Some(true));
    assert!(!selection.filters_active());

    selection.toggle_date("2024-01-01", true);
    assert!(selection.filters_active());

    selection.toggle_date("2024-02-01", true);
    assert!(!selection.filters_active());
}
