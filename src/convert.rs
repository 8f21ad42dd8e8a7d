//! Conversion of a source field's value into a destination field's
//! representation.
//!
//! The apply step writes the matched record's search-field value into
//! the destination field, which may be of a different type. Conversion
//! is exhaustive over the destination type and always produces a value
//! shaped for it, so a record never ends up with a value/type mismatch.

use crate::model::{CodeName, Field, FieldType, FieldValue};

/// Convert `source`'s value into `target`'s representation.
///
/// Text-like destinations take the stringified source value,
/// multi-select style destinations its entries as strings, entity
/// destinations its entries as `{code, name}` pairs. Attachment and
/// table destinations cannot be synthesized from foreign values and
/// come back empty unless the source already has the right shape.
pub fn convert_field_value(source: &Field, target: FieldType) -> FieldValue {
    let value = &source.value;
    match target {
        FieldType::SingleLineText => FieldValue::SingleLineText(value.as_text()),
        FieldType::MultiLineText => FieldValue::MultiLineText(value.as_text()),
        FieldType::RichText => FieldValue::RichText(value.as_text()),
        FieldType::Number => FieldValue::Number(value.as_text()),
        FieldType::Calc => FieldValue::Calc(value.as_text()),
        FieldType::RadioButton => FieldValue::RadioButton(value.as_text()),
        FieldType::DropDown => FieldValue::DropDown(value.as_text()),
        FieldType::Date => FieldValue::Date(value.as_text()),
        FieldType::Time => FieldValue::Time(value.as_text()),
        FieldType::DateTime => FieldValue::DateTime(value.as_text()),
        FieldType::Link => FieldValue::Link(value.as_text()),
        FieldType::Status => FieldValue::Status(value.as_text()),
        FieldType::RecordNumber => FieldValue::RecordNumber(value.as_text()),
        FieldType::CreatedTime => FieldValue::CreatedTime(value.as_text()),
        FieldType::UpdatedTime => FieldValue::UpdatedTime(value.as_text()),
        FieldType::Id => FieldValue::Id(value.as_text()),
        FieldType::Revision => FieldValue::Revision(value.as_text()),
        FieldType::CheckBox => FieldValue::CheckBox(value.as_string_list()),
        FieldType::MultiSelect => FieldValue::MultiSelect(value.as_string_list()),
        FieldType::Category => FieldValue::Category(value.as_string_list()),
        FieldType::UserSelect => FieldValue::UserSelect(value.as_entity_list()),
        FieldType::OrganizationSelect => FieldValue::OrganizationSelect(value.as_entity_list()),
        FieldType::GroupSelect => FieldValue::GroupSelect(value.as_entity_list()),
        FieldType::StatusAssignee => FieldValue::StatusAssignee(value.as_entity_list()),
        FieldType::Creator => FieldValue::Creator(first_entity(value)),
        FieldType::Modifier => FieldValue::Modifier(first_entity(value)),
        FieldType::File => match value {
            FieldValue::File(files) => FieldValue::File(files.clone()),
            _ => FieldValue::File(Vec::new()),
        },
        FieldType::Subtable => match value {
            FieldValue::Subtable(rows) => FieldValue::Subtable(rows.clone()),
            _ => FieldValue::Subtable(Vec::new()),
        },
    }
}

fn first_entity(value: &FieldValue) -> CodeName {
    value.as_entity_list().into_iter().next().unwrap_or_default()
}
