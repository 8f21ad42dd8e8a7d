//! Data model: records, typed field values, and lookup configuration.

pub mod condition;
pub mod field;

pub use condition::{
    AttachmentRef, ConditionId, CopyPair, DynamicFilter, LookupCondition, LookupTarget,
    SortCriterion, SortOrder,
};
pub use field::{CodeName, Field, FieldType, FieldValue, FileBody, LookupTag, Record, SubtableRow};
