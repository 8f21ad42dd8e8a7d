//! Lookup condition configuration.
//!
//! A condition describes one configured lookup relationship: which
//! source application to search, by which field, which destination
//! field receives the match, and which extra values ride along. The
//! engine treats conditions as immutable input; authoring and
//! persistence live outside this crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a configured lookup condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionId(Uuid);

impl ConditionId {
    /// Create a new condition ID with a fresh UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConditionId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ConditionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a condition writes its looked-up value.
///
/// Subtable targets are configured for row-wise lookups handled by the
/// host's table machinery; this engine skips them entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum LookupTarget {
    Field(String),
    Subtable(String),
}

impl LookupTarget {
    pub fn code(&self) -> &str {
        match self {
            LookupTarget::Field(code) | LookupTarget::Subtable(code) => code,
        }
    }
}

/// One `{from, to}` field mapping applied alongside the primary value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPair {
    pub from: String,
    pub to: String,
}

impl CopyPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A configured filter that compares a source-app field against a
/// field of the record being edited at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicFilter {
    /// Field on the source application to constrain.
    pub src_app_field: String,
    /// Field on the editing record supplying the comparison value.
    pub dst_app_field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Ordering applied when candidate records are listed for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: String,
    pub order: SortOrder,
}

/// One configured lookup relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupCondition {
    pub id: ConditionId,
    /// Source application searched for candidates.
    pub src_app_id: String,
    /// Space the source app lives in, when not the default space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_space_id: Option<String>,
    /// Whether `src_space_id` identifies a guest space; guest spaces
    /// need their id on every API call.
    #[serde(default)]
    pub src_app_is_guest: bool,
    /// Search field on the source application.
    pub src_field: String,
    /// Destination of the looked-up value on the editing record.
    pub target: LookupTarget,
    /// Raw extra filter appended to every search, already escaped by
    /// the configuration layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_query: Option<String>,
    /// Fields copied from the matched record alongside the primary
    /// value.
    #[serde(default)]
    pub copies: Vec<CopyPair>,
    /// Copy pairs whose destinations live inside subtable rows. Their
    /// sources still count toward the fetched field set, but applying
    /// them is the host table machinery's job.
    #[serde(default)]
    pub insubtable_copies: Vec<CopyPair>,
    /// Source-app fields shown when the user must pick among
    /// candidates.
    #[serde(default)]
    pub display_fields: Vec<String>,
    #[serde(default)]
    pub dynamic_filters: Vec<DynamicFilter>,
    #[serde(default)]
    pub sort_criteria: Vec<SortCriterion>,
    /// Run the lookup automatically when the search value changes.
    #[serde(default)]
    pub auto_lookup: bool,
    /// Allow the prefetch step to cache the full candidate set.
    #[serde(default)]
    pub enables_cache: bool,
    /// Require a successful lookup before the record can be saved
    /// (enforced by the host-side validation layer).
    #[serde(default)]
    pub enables_validation: bool,
}

impl LookupCondition {
    /// Whether this condition targets a subtable and is therefore
    /// outside this engine's scope.
    pub fn is_subtable(&self) -> bool {
        matches!(self.target, LookupTarget::Subtable(_))
    }

    /// The destination field code.
    pub fn dst_field(&self) -> &str {
        self.target.code()
    }
}

/// One concrete lookup widget instance: a condition plus, for widgets
/// repeated per subtable row, the row it is attached to. Keys all
/// per-instance session state so row widgets sharing a condition do
/// not interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub condition_id: ConditionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
}

impl AttachmentRef {
    pub fn new(condition_id: ConditionId) -> Self {
        Self {
            condition_id,
            row_index: None,
        }
    }

    pub fn in_row(condition_id: ConditionId, row_index: usize) -> Self {
        Self {
            condition_id,
            row_index: Some(row_index),
        }
    }
}
