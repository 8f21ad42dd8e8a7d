//! Applying a uniquely matched record to the editing record.
//!
//! Writes the converted search value into the destination field, copies
//! the configured field pairs across, tags everything written as
//! lookup-derived, and records apply state in the session. The caller's
//! record is never mutated; the result is a modified copy.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::convert::convert_field_value;
use crate::error::LookupError;
use crate::gateway::RecordGateway;
use crate::model::{AttachmentRef, FieldType, LookupCondition, LookupTag, Record};
use crate::session::LookupSession;

/// Delay before the secondary re-tag write. Long enough for the host's
/// own reactive recalculation to finish overwriting the field.
pub const RETAG_DELAY: Duration = Duration::from_millis(200);

/// Copy destinations that get the deferred secondary re-tag under
/// auto-lookup; the host recalculates only these types reactively.
fn needs_deferred_retag(field_type: FieldType) -> bool {
    matches!(field_type, FieldType::SingleLineText | FieldType::Number)
}

/// Apply `source` (the unique match) onto a copy of `target`.
///
/// Copy pairs with a missing side are logged and skipped; the rest of
/// the pairs still apply. A missing destination or search field is
/// fatal.
pub(crate) fn apply_match(
    gateway: &Arc<dyn RecordGateway>,
    condition: &LookupCondition,
    target: &Record,
    source: &Record,
    attachment: &AttachmentRef,
    session: &mut LookupSession,
) -> Result<Record, LookupError> {
    let mut record = target.clone();

    if condition.is_subtable() {
        return Ok(record);
    }

    let dst_field = record
        .resolve_field_mut(condition.dst_field(), attachment.row_index)
        .ok_or_else(|| LookupError::MissingField {
            code: condition.dst_field().to_string(),
        })?;

    let src_field = source
        .get(&condition.src_field)
        .ok_or_else(|| LookupError::SourceFieldMissing {
            code: condition.src_field.clone(),
        })?;
    let source_value = src_field.value.clone();

    let target_type = dst_field.field_type();
    dst_field.value = convert_field_value(src_field, target_type);
    dst_field.lookup = Some(LookupTag::Applied);
    dst_field.error = None;

    session.mark_applied(attachment, source_value);

    for pair in &condition.copies {
        let Some(from_field) = source.get(&pair.from) else {
            warn!(
                "copy source field '{}' is missing on the matched record; skipping the pair",
                pair.from
            );
            continue;
        };
        let Some(to_field) = record.get_mut(&pair.to) else {
            warn!(
                "copy destination field '{}' is missing on the record; skipping the pair",
                pair.to
            );
            continue;
        };

        to_field.value = from_field.value.clone();

        if condition.auto_lookup && needs_deferred_retag(to_field.field_type()) {
            match Handle::try_current() {
                Ok(handle) => {
                    let task = schedule_retag(&handle, Arc::clone(gateway), pair.to.clone());
                    session.track_retag(attachment, task);
                }
                Err(_) => warn!(
                    "no async runtime available; skipping deferred re-tag of '{}'",
                    pair.to
                ),
            }
        }
    }

    debug!(
        "lookup applied to '{}' from app {}",
        condition.dst_field(),
        condition.src_app_id
    );
    Ok(record)
}

/// Schedule the secondary write: after [`RETAG_DELAY`], re-read the
/// live record and re-tag `field_code` as lookup-derived. The task is
/// fire-and-forget; the session keeps its handle so a clear can cancel
/// it instead of racing it.
fn schedule_retag(
    handle: &Handle,
    gateway: Arc<dyn RecordGateway>,
    field_code: String,
) -> JoinHandle<()> {
    handle.spawn(async move {
        tokio::time::sleep(RETAG_DELAY).await;

        let mut record = match gateway.current_record() {
            Ok(record) => record,
            Err(err) => {
                warn!("deferred re-tag of '{}' skipped: {}", field_code, err);
                return;
            }
        };
        let Some(field) = record.get_mut(&field_code) else {
            warn!(
                "deferred re-tag target '{}' disappeared from the record",
                field_code
            );
            return;
        };
        field.lookup = Some(LookupTag::Applied);
        if let Err(err) = gateway.set_current_record(record) {
            warn!("deferred re-tag of '{}' failed: {}", field_code, err);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::QueryRequest;
    use crate::model::{ConditionId, CopyPair, Field, FieldValue, LookupTarget};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubGateway {
        live: Mutex<Record>,
    }

    #[async_trait]
    impl RecordGateway for StubGateway {
        fn current_record(&self) -> Result<Record, LookupError> {
            Ok(self.live.lock().unwrap().clone())
        }

        fn set_current_record(&self, record: Record) -> Result<(), LookupError> {
            *self.live.lock().unwrap() = record;
            Ok(())
        }

        async fn fetch_records(&self, _request: QueryRequest) -> Result<Vec<Record>, LookupError> {
            Ok(Vec::new())
        }
    }

    fn gateway() -> Arc<dyn RecordGateway> {
        Arc::new(StubGateway {
            live: Mutex::new(Record::new()),
        })
    }

    fn condition() -> LookupCondition {
        LookupCondition {
            id: ConditionId::new(),
            src_app_id: "12".into(),
            src_space_id: None,
            src_app_is_guest: false,
            src_field: "code".into(),
            target: LookupTarget::Field("dst".into()),
            filter_query: None,
            copies: vec![CopyPair::new("name", "display_name")],
            insubtable_copies: vec![],
            display_fields: vec![],
            dynamic_filters: vec![],
            sort_criteria: vec![],
            auto_lookup: false,
            enables_cache: false,
            enables_validation: false,
        }
    }

    fn target_record() -> Record {
        let mut record = Record::new();
        record.insert("dst", Field::new(FieldValue::SingleLineText("42".into())));
        record.insert(
            "display_name",
            Field::new(FieldValue::SingleLineText(String::new())),
        );
        record
    }

    fn source_record() -> Record {
        let mut record = Record::new();
        record.insert("code", Field::new(FieldValue::SingleLineText("42".into())));
        record.insert(
            "name",
            Field::new(FieldValue::SingleLineText("Alice".into())),
        );
        record
    }

    #[tokio::test]
    async fn applies_value_copies_and_tags() {
        let condition = condition();
        let attachment = AttachmentRef::new(condition.id);
        let mut session = LookupSession::new();
        let target = target_record();

        let applied = apply_match(
            &gateway(),
            &condition,
            &target,
            &source_record(),
            &attachment,
            &mut session,
        )
        .unwrap();

        let dst = applied.get("dst").unwrap();
        assert_eq!(dst.value, FieldValue::SingleLineText("42".into()));
        assert_eq!(dst.lookup, Some(LookupTag::Applied));
        assert_eq!(dst.error, None);
        assert_eq!(
            applied.get("display_name").unwrap().value,
            FieldValue::SingleLineText("Alice".into())
        );
        assert!(session.is_applied(&attachment));
        assert_eq!(
            session.value_at_lookup(&attachment),
            Some(&FieldValue::SingleLineText("42".into()))
        );

        // The caller's record is untouched.
        assert_eq!(target.get("dst").unwrap().lookup, None);
        assert_eq!(
            target.get("display_name").unwrap().value,
            FieldValue::SingleLineText(String::new())
        );
    }

    #[tokio::test]
    async fn missing_copy_pair_is_skipped_not_fatal() {
        let mut condition = condition();
        condition.copies = vec![
            CopyPair::new("absent", "display_name"),
            CopyPair::new("name", "absent_dst"),
            CopyPair::new("name", "display_name"),
        ];
        let attachment = AttachmentRef::new(condition.id);
        let mut session = LookupSession::new();

        let applied = apply_match(
            &gateway(),
            &condition,
            &target_record(),
            &source_record(),
            &attachment,
            &mut session,
        )
        .unwrap();

        assert_eq!(
            applied.get("display_name").unwrap().value,
            FieldValue::SingleLineText("Alice".into())
        );
    }

    #[tokio::test]
    async fn missing_source_field_is_a_configuration_error() {
        let mut condition = condition();
        condition.src_field = "absent".into();
        let attachment = AttachmentRef::new(condition.id);
        let mut session = LookupSession::new();

        let err = apply_match(
            &gateway(),
            &condition,
            &target_record(),
            &source_record(),
            &attachment,
            &mut session,
        )
        .unwrap_err();
        assert!(matches!(err, LookupError::SourceFieldMissing { code } if code == "absent"));
    }

    #[tokio::test]
    async fn subtable_condition_is_a_no_op() {
        let mut condition = condition();
        condition.target = LookupTarget::Subtable("table".into());
        let attachment = AttachmentRef::new(condition.id);
        let mut session = LookupSession::new();
        let target = target_record();

        let applied = apply_match(
            &gateway(),
            &condition,
            &target,
            &source_record(),
            &attachment,
            &mut session,
        )
        .unwrap();
        assert_eq!(applied, target);
        assert!(!session.is_applied(&attachment));
    }

    #[tokio::test]
    async fn value_at_lookup_captures_the_raw_source_value() {
        // Destination is text, source is an entity list; the session
        // must keep the pre-conversion entity value.
        let mut condition = condition();
        condition.src_field = "owner".into();
        condition.copies.clear();
        let attachment = AttachmentRef::new(condition.id);
        let mut session = LookupSession::new();

        let mut source = Record::new();
        let owner = FieldValue::UserSelect(vec![crate::model::CodeName::new("u-1", "Alice")]);
        source.insert("owner", Field::new(owner.clone()));

        let applied = apply_match(
            &gateway(),
            &condition,
            &target_record(),
            &source,
            &attachment,
            &mut session,
        )
        .unwrap();

        assert_eq!(
            applied.get("dst").unwrap().value,
            FieldValue::SingleLineText("Alice".into())
        );
        assert_eq!(session.value_at_lookup(&attachment), Some(&owner));
    }
}
