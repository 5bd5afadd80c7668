//! Change detection between the pre- and post-update rows

use chrono::DateTime;
use routinely_domain::{ChangeSet, Entity, FieldChange, Result, RoutinelyError};
use serde::Serialize;
use serde_json::{Map, Value};

/// Which keys an entity's audit ignores and which it accepts
#[derive(Debug, Clone, Copy)]
pub struct DiffPolicy {
    /// Edit-record entity, used in error codes.
    pub edit_entity: Entity,
    /// Identity, ownership, slug and timestamp keys.
    pub excluded: &'static [&'static str],
    /// Keys a change set may contain.
    pub editable: &'static [&'static str],
}

impl DiffPolicy {
    /// Reject change sets naming unknown or non-editable fields.
    pub fn validate(&self, changes: &ChangeSet) -> Result<()> {
        if let Some(key) = changes.keys().find(|key| !self.editable.contains(&key.as_str())) {
            return Err(RoutinelyError::InvalidChanges(format!("field `{key}` is not editable")));
        }
        Ok(())
    }
}

/// Diff `before` against `after` over the keys present in `patch`.
///
/// Keys in the policy's excluded set are skipped. RFC 3339 strings compare by
/// epoch millisecond; everything else by JSON equality. An absent value on
/// either side is recorded as `null`.
pub fn compute_changes<P, R>(policy: &DiffPolicy, patch: &P, before: &R, after: &R) -> Result<ChangeSet>
where
    P: Serialize,
    R: Serialize,
{
    let patch = to_object(patch)?;
    let before = to_object(before)?;
    let after = to_object(after)?;

    let mut changes = ChangeSet::new();
    for key in patch.keys() {
        if policy.excluded.contains(&key.as_str()) {
            continue;
        }
        let old = before.get(key).cloned().unwrap_or(Value::Null);
        let new = after.get(key).cloned().unwrap_or(Value::Null);
        if !values_equal(&old, &new) {
            changes.insert(key.clone(), FieldChange { old, new });
        }
    }
    Ok(changes)
}

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RoutinelyError::Internal(format!(
            "audited value must serialize to an object, got {other}"
        ))),
        Err(err) => Err(RoutinelyError::Internal(format!("failed to serialize audited value: {err}"))),
    }
}

fn values_equal(old: &Value, new: &Value) -> bool {
    if let (Value::String(a), Value::String(b)) = (old, new) {
        if let (Ok(a), Ok(b)) = (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
            return a.timestamp_millis() == b.timestamp_millis();
        }
    }
    old == new
}
