//! The lookup orchestrator: decides where to search, applies a unique
//! match, and hands non-unique outcomes back to the caller.

use std::sync::Arc;

use tracing::debug;

use crate::apply::apply_match;
use crate::clear::clear_lookup;
use crate::error::LookupError;
use crate::gateway::{AppMetadataProvider, RecordGateway};
use crate::matcher::cache::filter_cached;
use crate::matcher::remote::RemoteMatcher;
use crate::matcher::MatchOutcome;
use crate::model::{AttachmentRef, LookupCondition, Record};
use crate::session::LookupSession;

/// Result of one lookup run, returned to the caller who decides
/// whether to prompt on a non-unique outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// A unique match was found and applied; carries the updated copy
    /// of the record.
    Applied(Record),
    /// Nothing matched; the record is returned unchanged.
    NotFound(Record),
    /// More than one candidate matched; the record is returned
    /// unchanged alongside what was found.
    Ambiguous {
        record: Record,
        candidates: Vec<Record>,
    },
    /// The condition targets a subtable and is outside this engine's
    /// scope; the record is returned unchanged.
    Skipped(Record),
}

impl LookupOutcome {
    /// The record carried by this outcome.
    pub fn record(&self) -> &Record {
        match self {
            LookupOutcome::Applied(record)
            | LookupOutcome::NotFound(record)
            | LookupOutcome::Skipped(record)
            | LookupOutcome::Ambiguous { record, .. } => record,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            LookupOutcome::Applied(record)
            | LookupOutcome::NotFound(record)
            | LookupOutcome::Skipped(record)
            | LookupOutcome::Ambiguous { record, .. } => record,
        }
    }

    /// Collapse for callers with no way to resolve a miss
    /// interactively: non-unique outcomes become errors.
    pub fn into_result(self) -> Result<Record, LookupError> {
        match self {
            LookupOutcome::Applied(record) | LookupOutcome::Skipped(record) => Ok(record),
            LookupOutcome::NotFound(_) => Err(LookupError::NoMatch),
            LookupOutcome::Ambiguous { .. } => Err(LookupError::AmbiguousMatch),
        }
    }
}

/// Resolves lookups against a host record store.
///
/// Owns the host collaborators; all mutable lookup state lives in the
/// [`LookupSession`] passed into each call. Lookups for distinct
/// attachments may overlap freely; the session keys everything by
/// attachment.
pub struct LookupEngine {
    gateway: Arc<dyn RecordGateway>,
    metadata: Arc<dyn AppMetadataProvider>,
}

impl LookupEngine {
    pub fn new(gateway: Arc<dyn RecordGateway>, metadata: Arc<dyn AppMetadataProvider>) -> Self {
        Self { gateway, metadata }
    }

    /// Run one lookup for `attachment` against `record`.
    ///
    /// Searches the session's prefetched cache when the condition has
    /// one, otherwise issues one bounded remote query. A unique match
    /// is applied to a copy of the record; zero or many matches return
    /// the record unchanged inside the outcome.
    pub async fn lookup(
        &self,
        condition: &LookupCondition,
        record: Record,
        attachment: &AttachmentRef,
        session: &mut LookupSession,
    ) -> Result<LookupOutcome, LookupError> {
        if condition.is_subtable() {
            debug!("condition {} targets a subtable; skipping", condition.id);
            return Ok(LookupOutcome::Skipped(record));
        }

        let dst_field = record
            .resolve_field(condition.dst_field(), attachment.row_index)
            .ok_or_else(|| LookupError::MissingField {
                code: condition.dst_field().to_string(),
            })?;
        let dst_value = dst_field.value.clone();

        let outcome = if let Some(cached) = session.cached_records(condition.id) {
            debug!("all candidate records are cached; searching the cached set");
            let needle = dst_value.as_text();
            MatchOutcome::classify(filter_cached(cached, &condition.src_field, &needle))
        } else {
            let matcher = RemoteMatcher {
                gateway: self.gateway.as_ref(),
                metadata: self.metadata.as_ref(),
            };
            MatchOutcome::classify(matcher.search(condition, &dst_value).await?)
        };

        match outcome {
            MatchOutcome::Unique(source) => {
                let applied =
                    apply_match(&self.gateway, condition, &record, &source, attachment, session)?;
                Ok(LookupOutcome::Applied(applied))
            }
            MatchOutcome::None => Ok(LookupOutcome::NotFound(record)),
            MatchOutcome::Many(candidates) => Ok(LookupOutcome::Ambiguous { record, candidates }),
        }
    }

    /// Apply a specific source record (e.g. one the user picked from
    /// the ambiguity resolver) onto a copy of `target`.
    pub fn apply(
        &self,
        condition: &LookupCondition,
        target: &Record,
        source: &Record,
        attachment: &AttachmentRef,
        session: &mut LookupSession,
    ) -> Result<Record, LookupError> {
        apply_match(&self.gateway, condition, target, source, attachment, session)
    }

    /// Clear the lookup held by `attachment` on the live record and
    /// return the pre-clear snapshot.
    pub fn clear(
        &self,
        condition: &LookupCondition,
        attachment: &AttachmentRef,
        session: &mut LookupSession,
    ) -> Result<Record, LookupError> {
        clear_lookup(&self.gateway, condition, attachment, session)
    }
}
