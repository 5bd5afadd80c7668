//! Edit-record persistence for audited updates

use async_trait::async_trait;
use chrono::Utc;
use routinely_domain::{ChangeSet, EditRecord, Result};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::diff::{compute_changes, DiffPolicy};

/// Append-only store of edit records for one entity kind
#[async_trait]
pub trait EditLog: Send + Sync {
    async fn append_edit(&self, record: &EditRecord) -> Result<EditRecord>;

    /// Edits of one entity, newest first.
    async fn list_edits(&self, entity_id: &str) -> Result<Vec<EditRecord>>;
}

/// Result of an audited update: the stored row and the edit it produced, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Audited<T> {
    pub value: T,
    pub edit: Option<EditRecord>,
}

/// Generic audit recorder, parameterised by a [`DiffPolicy`]
#[derive(Debug, Clone, Copy)]
pub struct AuditRecorder {
    policy: DiffPolicy,
}

/// Who made an audited change, and why
#[derive(Debug, Clone, Copy)]
pub struct Editor<'a> {
    pub user_id: &'a str,
    pub summary: Option<&'a str>,
}

impl AuditRecorder {
    pub const fn new(policy: DiffPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> &DiffPolicy {
        &self.policy
    }

    /// Diff the update and append an edit record when anything changed.
    ///
    /// Returns `None`, writing nothing, when the diff is empty.
    pub async fn record<L, P, R>(
        &self,
        log: &L,
        entity_id: &str,
        editor: Editor<'_>,
        patch: &P,
        before: &R,
        after: &R,
    ) -> Result<Option<EditRecord>>
    where
        L: EditLog + ?Sized,
        P: Serialize + Sync,
        R: Serialize + Sync,
    {
        let changes = compute_changes(&self.policy, patch, before, after)?;
        if changes.is_empty() {
            debug!(entity_id, edit_entity = %self.policy.edit_entity, "Update changed nothing");
            return Ok(None);
        }
        self.policy.validate(&changes)?;

        let record = new_record(entity_id, editor, changes);
        let stored = log.append_edit(&record).await?;
        info!(
            entity_id,
            edit_id = %stored.id,
            changed_fields = ?stored.changes.keys().collect::<Vec<_>>(),
            "Edit recorded"
        );
        Ok(Some(stored))
    }
}

fn new_record(entity_id: &str, editor: Editor<'_>, changes: ChangeSet) -> EditRecord {
    EditRecord {
        id: Uuid::now_v7().to_string(),
        entity_id: entity_id.to_owned(),
        edited_by: editor.user_id.to_owned(),
        changes,
        summary: editor.summary.map(str::to_owned),
        created_at: Utc::now(),
    }
}
