//! Error code to status mapping and the JSON error envelope
//!
//! Transports never inspect error variants directly. They take the code from
//! [`RoutinelyError::code`], look the status up here and serialize an
//! [`ErrorEnvelope`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use routinely_domain::{Entity, RoutinelyError};
use serde::Serialize;

const ENTITIES: [Entity; 9] = [
    Entity::Habit,
    Entity::Check,
    Entity::Timing,
    Entity::Product,
    Entity::Ingredient,
    Entity::ProductIngredient,
    Entity::Tag,
    Entity::ProductEdit,
    Entity::IngredientEdit,
];

/// Per-entity code suffixes and their status.
const ENTITY_SUFFIXES: [(&str, u16); 5] = [
    ("not_found", 404),
    ("already_exists", 409),
    ("creation_failed", 500),
    ("update_failed", 500),
    ("delete_failed", 500),
];

const FIXED_CODES: [(&str, u16); 7] = [
    ("invalid_date_range", 400),
    ("invalid_changes", 400),
    ("invalid_input", 400),
    ("unauthorized_access", 403),
    ("database_error", 500),
    ("config_error", 500),
    ("internal_error", 500),
];

const DEFAULT_STATUS: u16 = 500;

static STATUS_TABLE: Lazy<HashMap<String, u16>> = Lazy::new(|| {
    let mut table: HashMap<String, u16> = FIXED_CODES
        .iter()
        .map(|(code, status)| ((*code).to_owned(), *status))
        .collect();
    for entity in ENTITIES {
        for (suffix, status) in ENTITY_SUFFIXES {
            table.insert(format!("{entity}_{suffix}"), status);
        }
    }
    table
});

/// HTTP status for an error code; unknown codes map to 500.
pub fn status_for(code: &str) -> u16 {
    STATUS_TABLE.get(code).copied().unwrap_or(DEFAULT_STATUS)
}

/// `{ "success": false, "error": <code>, "details": <payload>? }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    /// Status and envelope for `err`.
    pub fn from_error(err: &RoutinelyError) -> (u16, Self) {
        let code = err.code();
        let status = status_for(&code);
        if status >= 500 {
            tracing::error!(code = %code, error = %err, "request failed");
        } else {
            tracing::debug!(code = %code, "request rejected");
        }
        (status, Self { success: false, error: code, details: err.details() })
    }
}

impl From<&RoutinelyError> for ErrorEnvelope {
    fn from(err: &RoutinelyError) -> Self {
        Self::from_error(err).1
    }
}
