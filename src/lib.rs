//! recordlink - Lookup resolution between tabular record stores
//!
//! Given a record being edited, this crate finds a matching record in a
//! remote application by a configured search field and copies a
//! configured set of values from the match into the local record. The
//! hard parts live here: type-aware query construction, a cached
//! fast path that must branch identically to the remote path, the
//! zero/one/many outcome decision, per-type value conversion on apply,
//! and the reverse (clear) operation.
//!
//! The host platform's record store, metadata API and UI are consumed
//! through the traits in [`gateway`]; configuration authoring and
//! persistence live outside this crate.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use recordlink::{AttachmentRef, LookupEngine, LookupOutcome, LookupSession};
//! # use recordlink::gateway::{AppMetadataProvider, RecordGateway};
//! # async fn run(
//! #     gateway: Arc<dyn RecordGateway>,
//! #     metadata: Arc<dyn AppMetadataProvider>,
//! #     condition: recordlink::LookupCondition,
//! # ) -> Result<(), recordlink::LookupError> {
//! let engine = LookupEngine::new(gateway.clone(), metadata);
//! let mut session = LookupSession::new();
//! let attachment = AttachmentRef::new(condition.id);
//!
//! let record = gateway.current_record()?;
//! match engine.lookup(&condition, record, &attachment, &mut session).await? {
//!     LookupOutcome::Applied(record) => gateway.set_current_record(record)?,
//!     LookupOutcome::Ambiguous { .. } => { /* prompt the user to pick a candidate */ }
//!     LookupOutcome::NotFound(_) | LookupOutcome::Skipped(_) => {}
//! }
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Records, field values and lookup configuration
pub mod model;

// Search-capability classification and query construction
pub mod classify;
pub mod query;

// Host platform interfaces
pub mod gateway;

// Value conversion between field types
pub mod convert;

// Per-edit-session lookup state
pub mod session;

// Candidate matching and the orchestrating engine
pub mod matcher;

mod apply;
mod clear;
pub mod orchestrator;

// Public re-exports for the common surface
pub use apply::RETAG_DELAY;
pub use error::LookupError;
pub use matcher::MatchOutcome;
pub use model::{
    AttachmentRef, CodeName, ConditionId, CopyPair, Field, FieldType, FieldValue, LookupCondition,
    LookupTag, LookupTarget, Record,
};
pub use orchestrator::{LookupEngine, LookupOutcome};
pub use query::RESULT_CAP;
pub use session::LookupSession;
