//! Field-level edit history of catalog entities.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Old and new value of one changed field. Either side may be null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: serde_json::Value,
    pub new: serde_json::Value,
}

/// Changed fields keyed by their serialized name.
pub type ChangeSet = BTreeMap<String, FieldChange>;

/// Immutable record of one audited update. `changes` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub id: String,
    pub entity_id: String,
    pub edited_by: String,
    pub changes: ChangeSet,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}
