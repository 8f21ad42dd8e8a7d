//! Reversing an applied lookup.
//!
//! Clearing works on the live record rather than a passed-in copy: the
//! user triggers it independently of any in-flight apply. The prior
//! record is snapshotted and returned for undo/audit, the destination
//! and every copy destination reset to their type's empty value, and
//! the fields tagged so the host UI knows a lookup was cleared.
//! Copy-pair sources are never touched.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::LookupError;
use crate::gateway::RecordGateway;
use crate::model::{AttachmentRef, LookupCondition, LookupTag, Record};
use crate::session::LookupSession;

/// Clear the lookup held by `attachment` and write the live record
/// back. Returns the pre-clear snapshot. Pending deferred re-tag tasks
/// for the attachment are canceled first so they cannot fire onto the
/// cleared fields.
pub(crate) fn clear_lookup(
    gateway: &Arc<dyn RecordGateway>,
    condition: &LookupCondition,
    attachment: &AttachmentRef,
    session: &mut LookupSession,
) -> Result<Record, LookupError> {
    if condition.is_subtable() {
        return gateway.current_record();
    }

    session.cancel_pending_retags(attachment);

    let mut record = gateway.current_record()?;
    let snapshot = record.clone();

    let dst_field = record
        .resolve_field_mut(condition.dst_field(), attachment.row_index)
        .ok_or_else(|| LookupError::MissingField {
            code: condition.dst_field().to_string(),
        })?;

    if let Some(empty) = dst_field.field_type().cleared() {
        dst_field.value = empty;
    }
    dst_field.lookup = Some(LookupTag::Cleared);
    dst_field.error = None;

    for pair in &condition.copies {
        let Some(field) = record.get_mut(&pair.to) else {
            warn!(
                "copy destination field '{}' is missing on the record; skipping the pair",
                pair.to
            );
            continue;
        };
        if let Some(empty) = field.field_type().cleared() {
            field.value = empty;
        }
        if condition.auto_lookup {
            field.lookup = Some(LookupTag::Cleared);
        }
    }

    session.reset_applied(attachment);
    gateway.set_current_record(record)?;
    debug!("lookup cleared on '{}'", condition.dst_field());
    Ok(snapshot)
}
