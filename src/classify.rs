//! Search-capability classification of field types.
//!
//! Pure lookup tables deciding how a source field can be queried:
//! selection-style fields take set membership (`in`), text-style fields
//! take partial matching (`like`), everything else is exact equality.
//! Total over all known type tags; unknown capabilities default to
//! false.

use crate::model::FieldType;

/// Whether a field of this type is searched with set membership
/// (`field in (v1, v2, ...)`).
pub fn supports_multi_value_search(field_type: FieldType) -> bool {
    matches!(
        field_type,
        FieldType::CheckBox
            | FieldType::MultiSelect
            | FieldType::DropDown
            | FieldType::RadioButton
            | FieldType::Category
            | FieldType::Status
            | FieldType::StatusAssignee
            | FieldType::UserSelect
            | FieldType::OrganizationSelect
            | FieldType::GroupSelect
    )
}

/// Whether a field of this type supports partial (`like`) matching.
pub fn supports_partial_match(field_type: FieldType) -> bool {
    matches!(
        field_type,
        FieldType::SingleLineText
            | FieldType::MultiLineText
            | FieldType::RichText
            | FieldType::Link
            | FieldType::File
    )
}
