//! Lookup query construction.
//!
//! Builds the bounded search expression sent to the source application
//! from the destination field's current value, the search field's
//! classification, and the condition's extra filter. Every query is
//! capped at [`RESULT_CAP`] rows: the engine only distinguishes zero,
//! one, and more-than-one matches, so fetching further rows buys
//! nothing.

use tracing::debug;

use crate::classify::{supports_multi_value_search, supports_partial_match};
use crate::model::{FieldType, FieldValue};

/// Rows fetched per lookup query. Two is enough to tell a unique match
/// from an ambiguous one.
pub const RESULT_CAP: usize = 2;

/// Inputs for one query build.
#[derive(Debug, Clone, Copy)]
pub struct QueryParts<'a> {
    /// Search field code on the source application.
    pub src_field: &'a str,
    /// Type of the search field, when the source app metadata knows
    /// it. Unknown types fall back to exact matching.
    pub src_field_type: Option<FieldType>,
    /// Current value of the destination field, used as the search term.
    pub dst_value: &'a FieldValue,
    /// Raw extra filter from the condition, already escaped.
    pub extra_filter: Option<&'a str>,
}

/// Build the search expression. With neither a destination value nor
/// an extra filter the result is just the limit clause; callers must
/// still apply the usual zero/one/many decision to whatever such a
/// query returns.
pub fn build_query(parts: QueryParts<'_>) -> String {
    let values = parts.dst_value.query_values();

    let value_clause = if values.is_empty() {
        None
    } else if parts
        .src_field_type
        .is_some_and(supports_multi_value_search)
    {
        Some(format!("{} in ({})", parts.src_field, values.join(",")))
    } else {
        let operator = if parts.src_field_type.is_some_and(supports_partial_match) {
            "like"
        } else {
            "="
        };
        if values.len() > 1 {
            let clauses: Vec<String> = values
                .iter()
                .map(|v| format!("{} {} {}", parts.src_field, operator, v))
                .collect();
            Some(format!("({})", clauses.join(" or ")))
        } else {
            Some(format!("{} {} {}", parts.src_field, operator, values[0]))
        }
    };

    let extra = parts.extra_filter.filter(|f| !f.is_empty());
    let condition = match (value_clause, extra) {
        (Some(clause), Some(extra)) => format!("{clause} and {extra}"),
        (Some(clause), None) => clause,
        (None, Some(extra)) => extra.to_string(),
        (None, None) => String::new(),
    };

    let query = if condition.is_empty() {
        format!("limit {RESULT_CAP}")
    } else {
        format!("{condition} limit {RESULT_CAP}")
    };
    debug!("lookup query: {}", query);
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CodeName;

    #[test]
    fn text_field_uses_like() {
        let value = FieldValue::SingleLineText("42".into());
        let query = build_query(QueryParts {
            src_field: "code",
            src_field_type: Some(FieldType::SingleLineText),
            dst_value: &value,
            extra_filter: None,
        });
        assert_eq!(query, "code like 42 limit 2");
    }

    #[test]
    fn non_text_field_uses_equality() {
        let value = FieldValue::Number("42".into());
        let query = build_query(QueryParts {
            src_field: "qty",
            src_field_type: Some(FieldType::Number),
            dst_value: &value,
            extra_filter: None,
        });
        assert_eq!(query, "qty = 42 limit 2");
    }

    #[test]
    fn unknown_source_type_falls_back_to_equality() {
        let value = FieldValue::SingleLineText("x".into());
        let query = build_query(QueryParts {
            src_field: "code",
            src_field_type: None,
            dst_value: &value,
            extra_filter: None,
        });
        assert_eq!(query, "code = x limit 2");
    }

    #[test]
    fn multi_value_searchable_field_uses_in() {
        let value = FieldValue::MultiSelect(vec!["a".into(), "b".into()]);
        let query = build_query(QueryParts {
            src_field: "tags",
            src_field_type: Some(FieldType::MultiSelect),
            dst_value: &value,
            extra_filter: None,
        });
        assert_eq!(query, "tags in (a,b) limit 2");
    }

    #[test]
    fn multiple_values_without_set_support_become_an_or_group() {
        let value = FieldValue::CheckBox(vec!["a".into(), "b".into()]);
        let query = build_query(QueryParts {
            src_field: "name",
            src_field_type: Some(FieldType::SingleLineText),
            dst_value: &value,
            extra_filter: None,
        });
        assert_eq!(query, "(name like a or name like b) limit 2");
    }

    #[test]
    fn entity_values_search_by_code() {
        let value = FieldValue::UserSelect(vec![CodeName::new("u-1", "Alice")]);
        let query = build_query(QueryParts {
            src_field: "owner",
            src_field_type: Some(FieldType::UserSelect),
            dst_value: &value,
            extra_filter: None,
        });
        assert_eq!(query, "owner in (u-1) limit 2");
    }

    #[test]
    fn extra_filter_joins_with_and() {
        let value = FieldValue::SingleLineText("42".into());
        let query = build_query(QueryParts {
            src_field: "code",
            src_field_type: Some(FieldType::SingleLineText),
            dst_value: &value,
            extra_filter: Some("status = \"active\""),
        });
        assert_eq!(query, "code like 42 and status = \"active\" limit 2");
    }

    #[test]
    fn extra_filter_stands_alone_without_a_value() {
        let value = FieldValue::SingleLineText(String::new());
        let query = build_query(QueryParts {
            src_field: "code",
            src_field_type: Some(FieldType::SingleLineText),
            dst_value: &value,
            extra_filter: Some("status = \"active\""),
        });
        assert_eq!(query, "status = \"active\" limit 2");
    }

    #[test]
    fn empty_value_and_filter_leave_only_the_cap() {
        let value = FieldValue::SingleLineText(String::new());
        let query = build_query(QueryParts {
            src_field: "code",
            src_field_type: Some(FieldType::SingleLineText),
            dst_value: &value,
            extra_filter: None,
        });
        assert_eq!(query, "limit 2");
    }

    #[test]
    fn every_query_ends_with_the_cap() {
        let values = [
            FieldValue::SingleLineText("x".into()),
            FieldValue::MultiSelect(vec!["a".into(), "b".into()]),
            FieldValue::Number(String::new()),
        ];
        for dst_value in &values {
            for src_field_type in [None, Some(FieldType::SingleLineText), Some(FieldType::CheckBox)]
            {
                let query = build_query(QueryParts {
                    src_field: "f",
                    src_field_type,
                    dst_value,
                    extra_filter: Some("x = 1"),
                });
                assert!(query.ends_with("limit 2"), "unbounded query: {query}");
            }
        }
    }
}
