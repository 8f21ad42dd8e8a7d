//! Per-edit-session lookup state.
//!
//! The engine keeps no global state: every call takes a
//! [`LookupSession`] owned by the editing session and torn down with
//! it. The session tracks, per condition, the prefetched candidate
//! cache, and per attachment, whether a lookup has been applied, the
//! source value captured at apply time, and the handles of any pending
//! deferred re-tag tasks so they can be canceled instead of raced.

use std::collections::HashMap;

use tokio::task::JoinHandle;

use crate::model::{AttachmentRef, ConditionId, FieldValue, Record};

#[derive(Debug, Default)]
struct AttachmentState {
    applied: bool,
    value_at_lookup: Option<FieldValue>,
    pending_retags: Vec<JoinHandle<()>>,
}

/// Mutable lookup state for one record-editing session.
#[derive(Debug, Default)]
pub struct LookupSession {
    caches: HashMap<ConditionId, Vec<Record>>,
    attachments: HashMap<AttachmentRef, AttachmentState>,
}

impl LookupSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the full candidate set for a condition. Called by the
    /// host's prefetch step; afterwards lookups for this condition run
    /// against the cache instead of the remote app.
    pub fn prime_cache(&mut self, condition_id: ConditionId, records: Vec<Record>) {
        self.caches.insert(condition_id, records);
    }

    /// Forget a condition's prefetched candidates.
    pub fn drop_cache(&mut self, condition_id: ConditionId) {
        self.caches.remove(&condition_id);
    }

    /// The prefetched candidate set, when the condition has one.
    pub fn cached_records(&self, condition_id: ConditionId) -> Option<&[Record]> {
        self.caches.get(&condition_id).map(Vec::as_slice)
    }

    /// Whether this attachment currently holds an applied lookup.
    pub fn is_applied(&self, attachment: &AttachmentRef) -> bool {
        self.attachments
            .get(attachment)
            .is_some_and(|state| state.applied)
    }

    /// The raw source value captured when this attachment last applied
    /// a lookup. Lets the validation layer detect that the search value
    /// was edited after the fact.
    pub fn value_at_lookup(&self, attachment: &AttachmentRef) -> Option<&FieldValue> {
        self.attachments
            .get(attachment)?
            .value_at_lookup
            .as_ref()
    }

    pub(crate) fn mark_applied(&mut self, attachment: &AttachmentRef, source_value: FieldValue) {
        let state = self.attachments.entry(*attachment).or_default();
        state.applied = true;
        state.value_at_lookup = Some(source_value);
    }

    pub(crate) fn reset_applied(&mut self, attachment: &AttachmentRef) {
        let state = self.attachments.entry(*attachment).or_default();
        state.applied = false;
        state.value_at_lookup = None;
    }

    pub(crate) fn track_retag(&mut self, attachment: &AttachmentRef, handle: JoinHandle<()>) {
        let state = self.attachments.entry(*attachment).or_default();
        state.pending_retags.retain(|h| !h.is_finished());
        state.pending_retags.push(handle);
    }

    /// Abort deferred re-tag tasks still pending for this attachment.
    pub(crate) fn cancel_pending_retags(&mut self, attachment: &AttachmentRef) {
        if let Some(state) = self.attachments.get_mut(attachment) {
            for handle in state.pending_retags.drain(..) {
                handle.abort();
            }
        }
    }

    /// Drop all state and abort every pending deferred task. Called
    /// when the record editor closes.
    pub fn teardown(&mut self) {
        self.caches.clear();
        for state in self.attachments.values_mut() {
            for handle in state.pending_retags.drain(..) {
                handle.abort();
            }
        }
        self.attachments.clear();
    }
}

impl Drop for LookupSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
