//! Error types used throughout the application

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entities that can appear in a machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Habit,
    Check,
    Timing,
    Product,
    Ingredient,
    ProductIngredient,
    Tag,
    ProductEdit,
    IngredientEdit,
}

impl Entity {
    /// Stable snake_case name used as the prefix of error codes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Habit => "habit",
            Self::Check => "check",
            Self::Timing => "timing",
            Self::Product => "product",
            Self::Ingredient => "ingredient",
            Self::ProductIngredient => "product_ingredient",
            Self::Tag => "tag",
            Self::ProductEdit => "product_edit",
            Self::IngredientEdit => "ingredient_edit",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for Routinely
///
/// Every variant maps to a short machine-readable code (see
/// [`RoutinelyError::code`]) that the transport layer translates into a
/// status. Nothing in the core swallows these; callers decide about retries.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RoutinelyError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("{0} already exists")]
    AlreadyExists(Entity),

    #[error("{0} creation failed")]
    CreationFailed(Entity),

    #[error("{0} update failed")]
    UpdateFailed(Entity),

    #[error("{0} delete failed")]
    DeleteFailed(Entity),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid change set: {0}")]
    InvalidChanges(String),

    #[error("Unauthorized access")]
    UnauthorizedAccess,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoutinelyError {
    /// Machine-readable error code, e.g. `habit_not_found`.
    pub fn code(&self) -> String {
        match self {
            Self::NotFound(entity) => format!("{entity}_not_found"),
            Self::AlreadyExists(entity) => format!("{entity}_already_exists"),
            Self::CreationFailed(entity) => format!("{entity}_creation_failed"),
            Self::UpdateFailed(entity) => format!("{entity}_update_failed"),
            Self::DeleteFailed(entity) => format!("{entity}_delete_failed"),
            Self::InvalidDateRange { .. } => "invalid_date_range".to_owned(),
            Self::InvalidChanges(_) => "invalid_changes".to_owned(),
            Self::UnauthorizedAccess => "unauthorized_access".to_owned(),
            Self::InvalidInput(_) => "invalid_input".to_owned(),
            Self::Database(_) => "database_error".to_owned(),
            Self::Config(_) => "config_error".to_owned(),
            Self::Internal(_) => "internal_error".to_owned(),
        }
    }

    /// Optional structured payload attached to the error envelope.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::InvalidDateRange { start, end } => Some(serde_json::json!({
                "startDate": start.format("%Y-%m-%d").to_string(),
                "endDate": end.format("%Y-%m-%d").to_string(),
            })),
            Self::InvalidChanges(message) | Self::InvalidInput(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            _ => None,
        }
    }

    /// True for `*_not_found` errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for `*_already_exists` errors.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Result type alias for Routinely operations
pub type Result<T> = std::result::Result<T, RoutinelyError>;
