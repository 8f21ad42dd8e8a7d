//! Cache fast path: filter an already-prefetched candidate set.
//!
//! Used when the session holds every remote candidate for a condition.
//! The comparison is a string-level one-of check against the
//! destination's current value. That is looser than the type-aware
//! operators the remote query uses; the trade is zero network
//! round-trips when exhaustive candidate data is already resident.

use crate::model::Record;

/// Candidates whose search field textually matches `needle`.
/// Candidates missing the search field never match.
pub fn filter_cached(cached: &[Record], src_field: &str, needle: &str) -> Vec<Record> {
    cached
        .iter()
        .filter(|record| {
            record
                .get(src_field)
                .is_some_and(|field| field.value.matches_text(needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldValue};

    fn record_with_code(code: &str) -> Record {
        let mut record = Record::new();
        record.insert("code", Field::new(FieldValue::SingleLineText(code.into())));
        record
    }

    #[test]
    fn matches_on_stringified_value() {
        let cached = vec![record_with_code("42"), record_with_code("43")];
        let matched = filter_cached(&cached, "code", "42");
        assert_eq!(matched.len(), 1);
        assert_eq!(
            matched[0].get("code").unwrap().value,
            FieldValue::SingleLineText("42".into())
        );
    }

    #[test]
    fn candidates_without_the_search_field_never_match() {
        let cached = vec![Record::new(), record_with_code("42")];
        assert_eq!(filter_cached(&cached, "code", "42").len(), 1);
        assert!(filter_cached(&cached, "missing", "42").is_empty());
    }

    #[test]
    fn multi_valued_fields_match_one_of() {
        let mut record = Record::new();
        record.insert(
            "tags",
            Field::new(FieldValue::MultiSelect(vec!["a".into(), "b".into()])),
        );
        let cached = vec![record];
        assert_eq!(filter_cached(&cached, "tags", "b").len(), 1);
        assert!(filter_cached(&cached, "tags", "c").is_empty());
    }
}
