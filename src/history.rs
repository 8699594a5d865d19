use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Per-phase result for one state on one date. The source JSON stores
/// either a boolean or the literal string `"no-data"` for these fields;
/// an absent field also reads as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Unknown,
    Won,
    Lost,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Unknown => "no-data",
            Outcome::Won => "Yes",
            Outcome::Lost => "No",
        }
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OutcomeVisitor;

        impl Visitor<'_> for OutcomeVisitor {
            type Value = Outcome;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean or the string \"no-data\"")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Outcome, E> {
                Ok(if value { Outcome::Won } else { Outcome::Lost })
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Outcome, E> {
                if value == "no-data" {
                    Ok(Outcome::Unknown)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(OutcomeVisitor)
    }
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Outcome::Unknown => serializer.serialize_str("no-data"),
            Outcome::Won => serializer.serialize_bool(true),
            Outcome::Lost => serializer.serialize_bool(false),
        }
    }
}

/// The opposing state in a played match. The converter scripts write a
/// JSON number here, older exports a numeric string, and `"no-data"`
/// marks a record where the opponent was never captured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Opponent {
    #[default]
    Unknown,
    State(String),
}

impl Opponent {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Opponent::Unknown)
    }

    pub fn label(&self) -> &str {
        match self {
            Opponent::Unknown => "no-data",
            Opponent::State(id) => id,
        }
    }
}

impl<'de> Deserialize<'de> for Opponent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OpponentVisitor;

        impl Visitor<'_> for OpponentVisitor {
            type Value = Opponent;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a state id (number or string) or \"no-data\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Opponent, E> {
                Ok(Opponent::State(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Opponent, E> {
                Ok(Opponent::State(value.to_string()))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Opponent, E> {
                if value == "no-data" {
                    Ok(Opponent::Unknown)
                } else {
                    Ok(Opponent::State(value.to_string()))
                }
            }
        }

        deserializer.deserialize_any(OpponentVisitor)
    }
}

impl Serialize for Opponent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Opponent::Unknown => serializer.serialize_str("no-data"),
            Opponent::State(id) => match id.parse::<u64>() {
                Ok(n) => serializer.serialize_u64(n),
                Err(_) => serializer.serialize_str(id),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "won-prep", default)]
    pub won_prep: Outcome,
    #[serde(rename = "won-castle", default)]
    pub won_castle: Outcome,
    #[serde(rename = "had-svs-match", default, skip_serializing_if = "Option::is_none")]
    pub had_match: Option<bool>,
    #[serde(rename = "opposition-state", default, skip_serializing_if = "Opponent::is_unknown")]
    pub opposition: Opponent,
}

impl MatchRecord {
    /// Legacy exports predate `had-svs-match` and only ever recorded real
    /// matches, so an absent field counts as played.
    pub fn played(&self) -> bool {
        self.had_match.unwrap_or(true)
    }
}

/// Root of the fetched document. A payload without the expected
/// top-level key fails deserialization, which the loader reports as a
/// non-fatal load error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDoc {
    #[serde(rename = "svs-data-per-state")]
    pub per_state: HashMap<String, HashMap<String, MatchRecord>>,
}

/// Normalized view of a [`HistoryDoc`]; built once per load and
/// immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct HistoryData {
    /// Every known state id, numeric ids in ascending numeric order,
    /// anything else lexicographic after them.
    pub states: Vec<String>,
    /// De-duplicated union of every date key across every state,
    /// chronologically ascending.
    pub all_dates: Vec<String>,
    by_state: HashMap<String, HashMap<String, MatchRecord>>,
}

impl HistoryData {
    pub fn record(&self, state: &str, date: &str) -> Option<&MatchRecord> {
        self.by_state.get(state).and_then(|dates| dates.get(date))
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

pub struct Normalized {
    pub data: HistoryData,
    /// Integrity warnings; diagnostic only, never block rendering.
    pub warnings: Vec<String>,
}

pub fn normalize(doc: HistoryDoc) -> Normalized {
    let mut states: Vec<String> = doc.per_state.keys().cloned().collect();
    states.sort_by(|a, b| state_order(a, b));

    let mut seen = HashSet::new();
    let mut all_dates = Vec::new();
    for dates in doc.per_state.values() {
        for date in dates.keys() {
            if seen.insert(date.clone()) {
                all_dates.push(date.clone());
            }
        }
    }
    all_dates.sort_by(|a, b| date_order(a, b));

    // The union is computed from the same keys it is checked against, so
    // a miss here means the document changed under us mid-normalize.
    let mut warnings = Vec::new();
    for (state, dates) in &doc.per_state {
        for date in dates.keys() {
            if !seen.contains(date) {
                warnings.push(format!(
                    "date {date} in state {state} is missing from the computed date list"
                ));
            }
        }
    }

    Normalized {
        data: HistoryData {
            states,
            all_dates,
            by_state: doc.per_state,
        },
        warnings,
    }
}

pub fn state_label(id: &str) -> String {
    format!("State {id}")
}

/// Numeric ids order numerically; mixed or non-numeric ids fall back to
/// string order. Keeps row order stable across renders.
pub fn state_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Chronological order; keys that do not parse as dates sort after the
/// ones that do, in plain string order.
pub fn date_order(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_accepts_bool_and_sentinel() {
        assert_eq!(serde_json::from_str::<Outcome>("true").unwrap(), Outcome::Won);
        assert_eq!(serde_json::from_str::<Outcome>("false").unwrap(), Outcome::Lost);
        assert_eq!(
            serde_json::from_str::<Outcome>("\"no-data\"").unwrap(),
            Outcome::Unknown
        );
        assert!(serde_json::from_str::<Outcome>("\"maybe\"").is_err());
    }

    #[test]
    fn outcome_serializes_back_to_source_shape() {
        assert_eq!(serde_json::to_string(&Outcome::Won).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Outcome::Lost).unwrap(), "false");
        assert_eq!(
            serde_json::to_string(&Outcome::Unknown).unwrap(),
            "\"no-data\""
        );
    }

    #[test]
    fn opponent_accepts_number_string_and_sentinel() {
        assert_eq!(
            serde_json::from_str::<Opponent>("123").unwrap(),
            Opponent::State("123".to_string())
        );
        assert_eq!(
            serde_json::from_str::<Opponent>("\"45\"").unwrap(),
            Opponent::State("45".to_string())
        );
        assert_eq!(
            serde_json::from_str::<Opponent>("\"no-data\"").unwrap(),
            Opponent::Unknown
        );
    }

    #[test]
    fn record_without_had_match_counts_as_played() {
        let record: MatchRecord =
            serde_json::from_str(r#"{"won-prep": true, "won-castle": false}"#).unwrap();
        assert!(record.played());
        assert_eq!(record.won_prep, Outcome::Won);
        assert_eq!(record.won_castle, Outcome::Lost);
        assert_eq!(record.opposition, Opponent::Unknown);
    }

    #[test]
    fn state_order_is_numeric_when_possible() {
        let mut ids = vec!["10".to_string(), "2".to_string(), "100".to_string()];
        ids.sort_by(|a, b| state_order(a, b));
        assert_eq!(ids, vec!["2", "10", "100"]);
    }

    #[test]
    fn date_order_is_chronological_with_string_fallback() {
        assert_eq!(date_order("2024-01-02", "2024-01-10"), Ordering::Less);
        assert_eq!(date_order("2024-12-01", "2024-02-01"), Ordering::Greater);
        assert_eq!(date_order("2024-01-01", "not-a-date"), Ordering::Less);
        assert_eq!(date_order("aaa", "bbb"), Ordering::Less);
    }
}
