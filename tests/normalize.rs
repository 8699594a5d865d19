use svs_terminal::history::{normalize, HistoryDoc, Opponent, Outcome};

fn doc(raw: &str) -> HistoryDoc {
    serde_json::from_str(raw).expect("valid fixture json")
}

const SAMPLE: &str = r#"{
    "svs-data-per-state": {
        "30": {
            "2024-06-01": {"won-prep": true, "won-castle": false, "had-svs-match": true, "opposition-state": 77},
            "2024-05-01": {"won-prep": "no-data", "won-castle": "no-data"}
        },
        "7": {
            "2024-06-01": {"won-prep": false, "won-castle": true},
            "2024-04-01": {"had-svs-match": false}
        },
        "102": {}
    }
}"#;

#[test]
fn all_dates_is_sorted_deduped_union() {
    let normalized = normalize(doc(SAMPLE));
    assert_eq!(
        normalized.data.all_dates,
        vec!["2024-04-01", "2024-05-01", "2024-06-01"]
    );
    assert!(normalized.warnings.is_empty());
}

#[test]
fn every_record_date_is_in_the_union() {
    let normalized = normalize(doc(SAMPLE));
    for state in &normalized.data.states {
        for date in &normalized.data.all_dates {
            // Lookups must never panic, present or not.
            let _ = normalized.data.record(state, date);
        }
    }
    assert!(normalized
        .data
        .record("30", "2024-06-01")
        .is_some());
    assert!(normalized.data.record("102", "2024-06-01").is_none());
}

#[test]
fn states_are_ordered_numerically() {
    let normalized = normalize(doc(SAMPLE));
    assert_eq!(normalized.data.states, vec!["7", "30", "102"]);
}

#[test]
fn sentinel_and_boolean_fields_both_parse() {
    let normalized = normalize(doc(SAMPLE));
    let record = normalized.data.record("30", "2024-05-01").unwrap();
    assert_eq!(record.won_prep, Outcome::Unknown);
    assert_eq!(record.won_castle, Outcome::Unknown);
    assert_eq!(record.opposition, Opponent::Unknown);
    assert!(record.played());

    let record = normalized.data.record("30", "2024-06-01").unwrap();
    assert_eq!(record.won_prep, Outcome::Won);
    assert_eq!(record.won_castle, Outcome::Lost);
    assert_eq!(record.opposition, Opponent::State("77".to_string()));
}

#[test]
fn missing_root_key_is_a_parse_error() {
    let result = serde_json::from_str::<HistoryDoc>(r#"{"something-else": {}}"#);
    assert!(result.is_err());
}

#[test]
fn empty_document_normalizes_to_empty_data() {
    let normalized = normalize(doc(r#"{"svs-data-per-state": {}}"#));
    assert!(normalized.data.is_empty());
    assert!(normalized.data.all_dates.is_empty());
    assert!(normalized.warnings.is_empty());
}
