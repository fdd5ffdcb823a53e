//! Observed-vs-expected comparison

use steadyhand_core_types::normalize_text;

/// Case-insensitive, whitespace-normalised substring match.
///
/// A missing observation never matches, even against an empty expectation.
pub fn value_matches(expected: &str, observed: Option<&str>) -> bool {
    match observed {
        Some(observed) => normalize_text(observed).contains(&normalize_text(expected)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_substring_ignoring_case() {
        assert!(value_matches("expected text", Some("  Expected   TEXT here")));
        assert!(value_matches("rust", Some("RUST")));
        assert!(!value_matches("rust", Some("")));
        assert!(!value_matches("rust", None));
        assert!(!value_matches("", None));
    }
}
