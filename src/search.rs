//! Substring search over checkbox labels in the two selection panels.
//! Case-insensitive; a `*` in the term matches any run of characters.

pub fn matches_label(label: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    let label = label.to_lowercase();
    if term.contains('*') {
        wildcard_match(&label, &term)
    } else {
        label.contains(&term)
    }
}

// Unanchored: the pieces between stars must appear in order, anywhere.
fn wildcard_match(label: &str, pattern: &str) -> bool {
    let mut pos = 0;
    for piece in pattern.split('*').filter(|p| !p.is_empty()) {
        match label[pos..].find(piece) {
            Some(offset) => pos += offset + piece.len(),
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::matches_label;

    #[test]
    fn empty_term_matches_everything() {
        assert!(matches_label("State 12", ""));
        assert!(matches_label("State 12", "   "));
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        assert!(matches_label("State 12", "state 1"));
        assert!(matches_label("2024-06-01", "06-"));
        assert!(!matches_label("State 12", "state 3"));
    }

    #[test]
    fn wildcard_matches_runs() {
        assert!(matches_label("State 123", "1*3"));
        assert!(matches_label("2024-06-01", "2024*01"));
        assert!(!matches_label("State 12", "3*1"));
        assert!(matches_label("anything", "*"));
    }
}
