//! Host platform interfaces consumed by the engine.
//!
//! The engine never talks to the record store or the metadata API
//! directly; it goes through these traits so hosts, tests and tools can
//! supply their own transports. The only asynchronous crossings are the
//! remote record fetch and the source-app metadata read.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::model::{FieldType, Record};

/// One bounded remote search. The query arrives already capped; the
/// gateway must not page past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub app_id: String,
    pub query: String,
    /// Field codes to retrieve; everything the apply step may touch.
    pub fields: Vec<String>,
    /// Guest space the source app lives in, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_space_id: Option<String>,
}

/// Live access to the record being edited plus remote record search.
///
/// `current_record`/`set_current_record` are synchronous: the editing
/// record is host-side UI state, not a network resource.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Snapshot of the record currently being edited.
    fn current_record(&self) -> Result<Record, LookupError>;

    /// Replace the record currently being edited.
    fn set_current_record(&self, record: Record) -> Result<(), LookupError>;

    /// Run one bounded query against a remote application.
    async fn fetch_records(&self, request: QueryRequest) -> Result<Vec<Record>, LookupError>;
}

/// Field metadata of one application field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProperty {
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Read access to an application's form metadata, used to classify the
/// search semantics of the source field.
#[async_trait]
pub trait AppMetadataProvider: Send + Sync {
    /// Field code → property map for the given application.
    async fn field_properties(
        &self,
        app_id: &str,
    ) -> Result<HashMap<String, FieldProperty>, LookupError>;
}
