//! Remote query path: one bounded fetch against the source application.

use std::collections::HashSet;

use crate::error::LookupError;
use crate::gateway::{AppMetadataProvider, QueryRequest, RecordGateway};
use crate::model::{FieldValue, LookupCondition, Record};
use crate::query::{build_query, QueryParts};

/// The field set to retrieve for a condition: every code the apply and
/// selection steps may read — copy-pair sources (top-level and
/// in-subtable), display fields, the search field itself, dynamic
/// filter sources and sort fields — de-duplicated, first occurrence
/// wins.
pub fn lookup_src_fields(condition: &LookupCondition) -> Vec<String> {
    let mut fields = Vec::new();
    let mut seen = HashSet::new();
    let codes = condition
        .copies
        .iter()
        .map(|pair| pair.from.as_str())
        .chain(
            condition
                .insubtable_copies
                .iter()
                .map(|pair| pair.from.as_str()),
        )
        .chain(condition.display_fields.iter().map(String::as_str))
        .chain(std::iter::once(condition.src_field.as_str()))
        .chain(
            condition
                .dynamic_filters
                .iter()
                .map(|filter| filter.src_app_field.as_str()),
        )
        .chain(
            condition
                .sort_criteria
                .iter()
                .map(|criterion| criterion.field.as_str()),
        );
    for code in codes {
        if seen.insert(code) {
            fields.push(code.to_string());
        }
    }
    fields
}

/// Runs the remote half of a lookup: classify the search field via the
/// source app's metadata, build the bounded query, and fetch.
pub struct RemoteMatcher<'a> {
    pub gateway: &'a dyn RecordGateway,
    pub metadata: &'a dyn AppMetadataProvider,
}

impl RemoteMatcher<'_> {
    /// Fetch the candidate records for `dst_value`. The query is capped
    /// at two rows; any remote failure propagates to the caller
    /// untouched.
    pub async fn search(
        &self,
        condition: &LookupCondition,
        dst_value: &FieldValue,
    ) -> Result<Vec<Record>, LookupError> {
        let properties = self.metadata.field_properties(&condition.src_app_id).await?;
        let src_field_type = properties
            .get(&condition.src_field)
            .map(|property| property.field_type);

        let query = build_query(QueryParts {
            src_field: &condition.src_field,
            src_field_type,
            dst_value,
            extra_filter: condition.filter_query.as_deref(),
        });

        let request = QueryRequest {
            app_id: condition.src_app_id.clone(),
            query,
            fields: lookup_src_fields(condition),
            guest_space_id: condition
                .src_app_is_guest
                .then(|| condition.src_space_id.clone())
                .flatten(),
        };
        self.gateway.fetch_records(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConditionId, CopyPair, DynamicFilter, LookupTarget, SortCriterion, SortOrder};

    fn condition() -> LookupCondition {
        LookupCondition {
            id: ConditionId::new(),
            src_app_id: "12".into(),
            src_space_id: None,
            src_app_is_guest: false,
            src_field: "code".into(),
            target: LookupTarget::Field("dst".into()),
            filter_query: None,
            copies: vec![CopyPair::new("name", "display_name")],
            insubtable_copies: vec![CopyPair::new("unit_price", "price")],
            display_fields: vec!["name".into(), "address".into()],
            dynamic_filters: vec![DynamicFilter {
                src_app_field: "region".into(),
                dst_app_field: "region".into(),
            }],
            sort_criteria: vec![SortCriterion {
                field: "code".into(),
                order: SortOrder::Asc,
            }],
            auto_lookup: false,
            enables_cache: false,
            enables_validation: false,
        }
    }

    #[test]
    fn field_set_is_the_deduplicated_union() {
        let fields = lookup_src_fields(&condition());
        assert_eq!(
            fields,
            vec!["name", "unit_price", "address", "code", "region"]
        );
    }

    #[test]
    fn search_field_is_always_included() {
        let mut condition = condition();
        condition.copies.clear();
        condition.insubtable_copies.clear();
        condition.display_fields.clear();
        condition.dynamic_filters.clear();
        condition.sort_criteria.clear();
        assert_eq!(lookup_src_fields(&condition), vec!["code"]);
    }
}
