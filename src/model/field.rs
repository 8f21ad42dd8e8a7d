//! Record and field model.
//!
//! A record is a mapping from field code to [`Field`]; a field carries a
//! typed value plus the lookup bookkeeping the host UI understands
//! (`lookup` tag, validation `error`). Field values are a closed sum
//! type with one variant per host field type, so type-driven behavior
//! (clearing, conversion, query extraction) is matched exhaustively and
//! new field types cannot silently fall through.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `{code, name}` entity value (users, organizations, groups).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeName {
    pub code: String,
    pub name: String,
}

impl CodeName {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// One attached file on a file field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBody {
    pub content_type: String,
    pub file_key: String,
    pub name: String,
    pub size: String,
}

/// One row of a subtable field: a row id plus its own code → field map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtableRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: HashMap<String, Field>,
}

/// Field type tags, mirroring the host platform's type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    SingleLineText,
    MultiLineText,
    RichText,
    Number,
    Calc,
    RadioButton,
    CheckBox,
    MultiSelect,
    DropDown,
    Date,
    Time,
    #[serde(rename = "DATETIME")]
    DateTime,
    Link,
    File,
    UserSelect,
    OrganizationSelect,
    GroupSelect,
    Category,
    Status,
    StatusAssignee,
    RecordNumber,
    Creator,
    CreatedTime,
    Modifier,
    UpdatedTime,
    Subtable,
    #[serde(rename = "__ID__")]
    Id,
    #[serde(rename = "__REVISION__")]
    Revision,
}

impl FieldType {
    /// Every known field type, in declaration order.
    pub const ALL: [FieldType; 28] = [
        FieldType::SingleLineText,
        FieldType::MultiLineText,
        FieldType::RichText,
        FieldType::Number,
        FieldType::Calc,
        FieldType::RadioButton,
        FieldType::CheckBox,
        FieldType::MultiSelect,
        FieldType::DropDown,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::Link,
        FieldType::File,
        FieldType::UserSelect,
        FieldType::OrganizationSelect,
        FieldType::GroupSelect,
        FieldType::Category,
        FieldType::Status,
        FieldType::StatusAssignee,
        FieldType::RecordNumber,
        FieldType::Creator,
        FieldType::CreatedTime,
        FieldType::Modifier,
        FieldType::UpdatedTime,
        FieldType::Subtable,
        FieldType::Id,
        FieldType::Revision,
    ];

    /// The value a field of this type is reset to when a lookup is
    /// cleared. `None` means the value is left untouched: radio and
    /// status fields have no defined empty state, and computed/system
    /// fields are read-only.
    pub fn cleared(self) -> Option<FieldValue> {
        match self {
            FieldType::SingleLineText => Some(FieldValue::SingleLineText(String::new())),
            FieldType::MultiLineText => Some(FieldValue::MultiLineText(String::new())),
            FieldType::RichText => Some(FieldValue::RichText(String::new())),
            FieldType::Number => Some(FieldValue::Number(String::new())),
            FieldType::DropDown => Some(FieldValue::DropDown(String::new())),
            FieldType::Date => Some(FieldValue::Date(String::new())),
            FieldType::Time => Some(FieldValue::Time(String::new())),
            FieldType::DateTime => Some(FieldValue::DateTime(String::new())),
            FieldType::Link => Some(FieldValue::Link(String::new())),
            FieldType::CreatedTime => Some(FieldValue::CreatedTime(String::new())),
            FieldType::UpdatedTime => Some(FieldValue::UpdatedTime(String::new())),
            FieldType::Creator => Some(FieldValue::Creator(CodeName::default())),
            FieldType::Modifier => Some(FieldValue::Modifier(CodeName::default())),
            FieldType::Category => Some(FieldValue::Category(Vec::new())),
            FieldType::CheckBox => Some(FieldValue::CheckBox(Vec::new())),
            FieldType::MultiSelect => Some(FieldValue::MultiSelect(Vec::new())),
            FieldType::File => Some(FieldValue::File(Vec::new())),
            FieldType::GroupSelect => Some(FieldValue::GroupSelect(Vec::new())),
            FieldType::OrganizationSelect => Some(FieldValue::OrganizationSelect(Vec::new())),
            FieldType::UserSelect => Some(FieldValue::UserSelect(Vec::new())),
            FieldType::StatusAssignee => Some(FieldValue::StatusAssignee(Vec::new())),
            FieldType::Subtable => Some(FieldValue::Subtable(Vec::new())),
            // No defined empty state; resetting these is not supported.
            FieldType::RadioButton | FieldType::Status => None,
            // Read-only, maintained by the host.
            FieldType::Calc | FieldType::RecordNumber | FieldType::Id | FieldType::Revision => None,
        }
    }
}

/// A typed field value. Serialized in the host wire shape
/// `{"type": "...", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldValue {
    SingleLineText(String),
    MultiLineText(String),
    RichText(String),
    Number(String),
    Calc(String),
    RadioButton(String),
    CheckBox(Vec<String>),
    MultiSelect(Vec<String>),
    DropDown(String),
    Date(String),
    Time(String),
    #[serde(rename = "DATETIME")]
    DateTime(String),
    Link(String),
    File(Vec<FileBody>),
    UserSelect(Vec<CodeName>),
    OrganizationSelect(Vec<CodeName>),
    GroupSelect(Vec<CodeName>),
    Category(Vec<String>),
    Status(String),
    StatusAssignee(Vec<CodeName>),
    RecordNumber(String),
    Creator(CodeName),
    CreatedTime(String),
    Modifier(CodeName),
    UpdatedTime(String),
    Subtable(Vec<SubtableRow>),
    #[serde(rename = "__ID__")]
    Id(String),
    #[serde(rename = "__REVISION__")]
    Revision(String),
}

impl FieldValue {
    /// The type tag of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::SingleLineText(_) => FieldType::SingleLineText,
            FieldValue::MultiLineText(_) => FieldType::MultiLineText,
            FieldValue::RichText(_) => FieldType::RichText,
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Calc(_) => FieldType::Calc,
            FieldValue::RadioButton(_) => FieldType::RadioButton,
            FieldValue::CheckBox(_) => FieldType::CheckBox,
            FieldValue::MultiSelect(_) => FieldType::MultiSelect,
            FieldValue::DropDown(_) => FieldType::DropDown,
            FieldValue::Date(_) => FieldType::Date,
            FieldValue::Time(_) => FieldType::Time,
            FieldValue::DateTime(_) => FieldType::DateTime,
            FieldValue::Link(_) => FieldType::Link,
            FieldValue::File(_) => FieldType::File,
            FieldValue::UserSelect(_) => FieldType::UserSelect,
            FieldValue::OrganizationSelect(_) => FieldType::OrganizationSelect,
            FieldValue::GroupSelect(_) => FieldType::GroupSelect,
            FieldValue::Category(_) => FieldType::Category,
            FieldValue::Status(_) => FieldType::Status,
            FieldValue::StatusAssignee(_) => FieldType::StatusAssignee,
            FieldValue::RecordNumber(_) => FieldType::RecordNumber,
            FieldValue::Creator(_) => FieldType::Creator,
            FieldValue::CreatedTime(_) => FieldType::CreatedTime,
            FieldValue::Modifier(_) => FieldType::Modifier,
            FieldValue::UpdatedTime(_) => FieldType::UpdatedTime,
            FieldValue::Subtable(_) => FieldType::Subtable,
            FieldValue::Id(_) => FieldType::Id,
            FieldValue::Revision(_) => FieldType::Revision,
        }
    }

    /// Whether this value is semantically empty (empty string, empty
    /// collection, blank entity).
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::SingleLineText(v)
            | FieldValue::MultiLineText(v)
            | FieldValue::RichText(v)
            | FieldValue::Number(v)
            | FieldValue::Calc(v)
            | FieldValue::RadioButton(v)
            | FieldValue::DropDown(v)
            | FieldValue::Date(v)
            | FieldValue::Time(v)
            | FieldValue::DateTime(v)
            | FieldValue::Link(v)
            | FieldValue::Status(v)
            | FieldValue::RecordNumber(v)
            | FieldValue::CreatedTime(v)
            | FieldValue::UpdatedTime(v)
            | FieldValue::Id(v)
            | FieldValue::Revision(v) => v.is_empty(),
            FieldValue::CheckBox(v) | FieldValue::MultiSelect(v) | FieldValue::Category(v) => {
                v.is_empty()
            }
            FieldValue::UserSelect(v)
            | FieldValue::OrganizationSelect(v)
            | FieldValue::GroupSelect(v)
            | FieldValue::StatusAssignee(v) => v.is_empty(),
            FieldValue::File(v) => v.is_empty(),
            FieldValue::Creator(e) | FieldValue::Modifier(e) => {
                e.code.is_empty() && e.name.is_empty()
            }
            FieldValue::Subtable(rows) => rows.is_empty(),
        }
    }

    /// The value rendered as a single display string. Collections join
    /// with `", "`, entities render their display name.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::SingleLineText(v)
            | FieldValue::MultiLineText(v)
            | FieldValue::RichText(v)
            | FieldValue::Number(v)
            | FieldValue::Calc(v)
            | FieldValue::RadioButton(v)
            | FieldValue::DropDown(v)
            | FieldValue::Date(v)
            | FieldValue::Time(v)
            | FieldValue::DateTime(v)
            | FieldValue::Link(v)
            | FieldValue::Status(v)
            | FieldValue::RecordNumber(v)
            | FieldValue::CreatedTime(v)
            | FieldValue::UpdatedTime(v)
            | FieldValue::Id(v)
            | FieldValue::Revision(v) => v.clone(),
            FieldValue::CheckBox(v) | FieldValue::MultiSelect(v) | FieldValue::Category(v) => {
                v.join(", ")
            }
            FieldValue::UserSelect(v)
            | FieldValue::OrganizationSelect(v)
            | FieldValue::GroupSelect(v)
            | FieldValue::StatusAssignee(v) => v
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::File(v) => v
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Creator(e) | FieldValue::Modifier(e) => e.name.clone(),
            FieldValue::Subtable(_) => String::new(),
        }
    }

    /// The search terms this value contributes to a lookup query.
    /// Scalar values yield at most one term; multi-valued fields yield
    /// one per entry; entity values search by code.
    pub fn query_values(&self) -> Vec<String> {
        match self {
            FieldValue::SingleLineText(v)
            | FieldValue::MultiLineText(v)
            | FieldValue::RichText(v)
            | FieldValue::Number(v)
            | FieldValue::Calc(v)
            | FieldValue::RadioButton(v)
            | FieldValue::DropDown(v)
            | FieldValue::Date(v)
            | FieldValue::Time(v)
            | FieldValue::DateTime(v)
            | FieldValue::Link(v)
            | FieldValue::Status(v)
            | FieldValue::RecordNumber(v)
            | FieldValue::CreatedTime(v)
            | FieldValue::UpdatedTime(v)
            | FieldValue::Id(v)
            | FieldValue::Revision(v) => {
                if v.is_empty() {
                    Vec::new()
                } else {
                    vec![v.clone()]
                }
            }
            FieldValue::CheckBox(v) | FieldValue::MultiSelect(v) | FieldValue::Category(v) => {
                v.iter().filter(|s| !s.is_empty()).cloned().collect()
            }
            FieldValue::UserSelect(v)
            | FieldValue::OrganizationSelect(v)
            | FieldValue::GroupSelect(v)
            | FieldValue::StatusAssignee(v) => v
                .iter()
                .filter(|e| !e.code.is_empty())
                .map(|e| e.code.clone())
                .collect(),
            FieldValue::File(v) => v
                .iter()
                .filter(|f| !f.name.is_empty())
                .map(|f| f.name.clone())
                .collect(),
            FieldValue::Creator(e) | FieldValue::Modifier(e) => {
                if e.code.is_empty() {
                    Vec::new()
                } else {
                    vec![e.code.clone()]
                }
            }
            FieldValue::Subtable(_) => Vec::new(),
        }
    }

    /// Whether any of this field's values textually equals `needle`.
    /// Entity values match on either code or name. Used by the cache
    /// fast path, which compares stringified values instead of running
    /// type-aware operators.
    pub fn matches_text(&self, needle: &str) -> bool {
        match self {
            FieldValue::SingleLineText(v)
            | FieldValue::MultiLineText(v)
            | FieldValue::RichText(v)
            | FieldValue::Number(v)
            | FieldValue::Calc(v)
            | FieldValue::RadioButton(v)
            | FieldValue::DropDown(v)
            | FieldValue::Date(v)
            | FieldValue::Time(v)
            | FieldValue::DateTime(v)
            | FieldValue::Link(v)
            | FieldValue::Status(v)
            | FieldValue::RecordNumber(v)
            | FieldValue::CreatedTime(v)
            | FieldValue::UpdatedTime(v)
            | FieldValue::Id(v)
            | FieldValue::Revision(v) => v == needle,
            FieldValue::CheckBox(v) | FieldValue::MultiSelect(v) | FieldValue::Category(v) => {
                v.iter().any(|s| s == needle)
            }
            FieldValue::UserSelect(v)
            | FieldValue::OrganizationSelect(v)
            | FieldValue::GroupSelect(v)
            | FieldValue::StatusAssignee(v) => {
                v.iter().any(|e| e.code == needle || e.name == needle)
            }
            FieldValue::File(v) => v.iter().any(|f| f.name == needle),
            FieldValue::Creator(e) | FieldValue::Modifier(e) => {
                e.code == needle || e.name == needle
            }
            FieldValue::Subtable(_) => false,
        }
    }

    /// The value as a list of plain strings (for multi-select style
    /// destinations). Entities contribute their display names.
    pub fn as_string_list(&self) -> Vec<String> {
        match self {
            FieldValue::CheckBox(v) | FieldValue::MultiSelect(v) | FieldValue::Category(v) => {
                v.clone()
            }
            FieldValue::UserSelect(v)
            | FieldValue::OrganizationSelect(v)
            | FieldValue::GroupSelect(v)
            | FieldValue::StatusAssignee(v) => v.iter().map(|e| e.name.clone()).collect(),
            FieldValue::File(v) => v.iter().map(|f| f.name.clone()).collect(),
            other => {
                let text = other.as_text();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text]
                }
            }
        }
    }

    /// The value as a list of entities (for user/organization/group
    /// style destinations). Plain values become `{code, name}` pairs
    /// keyed by their text.
    pub fn as_entity_list(&self) -> Vec<CodeName> {
        match self {
            FieldValue::UserSelect(v)
            | FieldValue::OrganizationSelect(v)
            | FieldValue::GroupSelect(v)
            | FieldValue::StatusAssignee(v) => v.clone(),
            FieldValue::Creator(e) | FieldValue::Modifier(e) => vec![e.clone()],
            other => {
                let text = other.as_text();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![CodeName::new(text.clone(), text)]
                }
            }
        }
    }
}

/// Marker written onto fields touched by a lookup, understood by the
/// host UI: `true` after an apply, `"CLEAR"` after a clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTag {
    Applied,
    Cleared,
}

impl Serialize for LookupTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LookupTag::Applied => serializer.serialize_bool(true),
            LookupTag::Cleared => serializer.serialize_str("CLEAR"),
        }
    }
}

impl<'de> Deserialize<'de> for LookupTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl Visitor<'_> for TagVisitor {
            type Value = LookupTag;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`true` or \"CLEAR\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<LookupTag, E> {
                if v {
                    Ok(LookupTag::Applied)
                } else {
                    Err(E::custom("lookup tag cannot be `false`"))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LookupTag, E> {
                if v == "CLEAR" {
                    Ok(LookupTag::Cleared)
                } else {
                    Err(E::custom(format!("unknown lookup tag '{v}'")))
                }
            }
        }

        deserializer.deserialize_any(TagVisitor)
    }
}

/// A field on a record: its typed value plus lookup bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(flatten)]
    pub value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Field {
    pub fn new(value: FieldValue) -> Self {
        Self {
            value,
            lookup: None,
            error: None,
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }
}

impl From<FieldValue> for Field {
    fn from(value: FieldValue) -> Self {
        Field::new(value)
    }
}

/// The record being edited (or fetched): field code → field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<&Field> {
        self.fields.get(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut Field> {
        self.fields.get_mut(code)
    }

    pub fn insert(&mut self, code: impl Into<String>, field: impl Into<Field>) {
        self.fields.insert(code.into(), field.into());
    }

    pub fn contains(&self, code: &str) -> bool {
        self.fields.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve a field by code. With a row index the field is looked up
    /// inside the matching row of whichever subtable contains it; a
    /// stale index resolves to `None`.
    pub fn resolve_field(&self, code: &str, row_index: Option<usize>) -> Option<&Field> {
        match row_index {
            None => self.fields.get(code),
            Some(row) => self.fields.values().find_map(|field| match &field.value {
                FieldValue::Subtable(rows) => rows.get(row).and_then(|r| r.value.get(code)),
                _ => None,
            }),
        }
    }

    /// Mutable variant of [`Record::resolve_field`].
    pub fn resolve_field_mut(&mut self, code: &str, row_index: Option<usize>) -> Option<&mut Field> {
        match row_index {
            None => self.fields.get_mut(code),
            Some(row) => {
                let table_code = self.fields.iter().find_map(|(tc, field)| match &field.value {
                    FieldValue::Subtable(rows) => rows
                        .get(row)
                        .and_then(|r| r.value.contains_key(code).then(|| tc.clone())),
                    _ => None,
                })?;
                match &mut self.fields.get_mut(&table_code)?.value {
                    FieldValue::Subtable(rows) => rows.get_mut(row)?.value.get_mut(code),
                    _ => None,
                }
            }
        }
    }
}

impl FromIterator<(String, Field)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Field)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleared_values_match_their_type() {
        for field_type in FieldType::ALL {
            if let Some(value) = field_type.cleared() {
                assert_eq!(value.field_type(), field_type);
                assert!(value.is_empty(), "{field_type:?} must clear to empty");
            }
        }
    }

    #[test]
    fn radio_status_and_system_types_have_no_empty_state() {
        for field_type in [
            FieldType::RadioButton,
            FieldType::Status,
            FieldType::Calc,
            FieldType::RecordNumber,
            FieldType::Id,
            FieldType::Revision,
        ] {
            assert!(field_type.cleared().is_none());
        }
    }

    #[test]
    fn field_serializes_in_wire_shape() {
        let field = Field {
            value: FieldValue::SingleLineText("Alice".into()),
            lookup: Some(LookupTag::Applied),
            error: None,
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "SINGLE_LINE_TEXT", "value": "Alice", "lookup": true})
        );

        let cleared = Field {
            value: FieldValue::UserSelect(vec![]),
            lookup: Some(LookupTag::Cleared),
            error: None,
        };
        let json = serde_json::to_value(&cleared).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "USER_SELECT", "value": [], "lookup": "CLEAR"})
        );
    }

    #[test]
    fn entity_values_match_on_code_or_name() {
        let value = FieldValue::UserSelect(vec![
            CodeName::new("u-1", "Alice"),
            CodeName::new("u-2", "Bob"),
        ]);
        assert!(value.matches_text("u-2"));
        assert!(value.matches_text("Alice"));
        assert!(!value.matches_text("Carol"));
        assert_eq!(value.query_values(), vec!["u-1", "u-2"]);
        assert_eq!(value.as_text(), "Alice, Bob");
    }

    #[test]
    fn resolves_fields_inside_subtable_rows() {
        let mut row = SubtableRow::default();
        row.value.insert(
            "item".into(),
            Field::new(FieldValue::SingleLineText("bolt".into())),
        );
        let mut record = Record::new();
        record.insert("table", FieldValue::Subtable(vec![row]));
        record.insert("title", FieldValue::SingleLineText("top".into()));

        assert!(record.resolve_field("item", Some(0)).is_some());
        assert!(record.resolve_field("item", Some(1)).is_none());
        assert!(record.resolve_field("item", None).is_none());
        assert!(record.resolve_field("title", None).is_some());

        let field = record.resolve_field_mut("item", Some(0)).unwrap();
        field.value = FieldValue::SingleLineText("nut".into());
        assert_eq!(
            record.resolve_field("item", Some(0)).unwrap().value,
            FieldValue::SingleLineText("nut".into())
        );
    }
}
