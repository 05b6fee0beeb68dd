//! Restaurant domain model.
//!
//! # Responsibility
//! - Define the restaurant record picked by the selection engine.
//! - Provide lifecycle helpers for selection and cooldown reset.
//!
//! # Invariants
//! - `id` is stable and never reused for another restaurant.
//! - `last_selected_at` is `None` iff the restaurant was never picked or its
//!   cooldown was reset.
//! - `name` is never blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a restaurant row.
pub type RestaurantId = Uuid;

/// Canonical restaurant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    /// Display name exactly as entered (trimmed).
    pub name: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms of the most recent selection, if any.
    pub last_selected_at: Option<i64>,
    /// Caller-side visibility flag. Selection does not filter on it.
    pub is_active: bool,
    /// Optional free-text note.
    pub note: Option<String>,
}

/// Validation failures for restaurant records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestaurantValidationError {
    BlankName,
}

impl Display for RestaurantValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "restaurant name must not be blank"),
        }
    }
}

impl Error for RestaurantValidationError {}

impl Restaurant {
    /// Creates an active, never-selected restaurant with a generated ID.
    pub fn new(name: impl Into<String>, created_at: i64) -> Self {
        Self::with_id(Uuid::new_v4(), name, created_at)
    }

    /// Creates a restaurant with a caller-provided stable ID.
    pub fn with_id(id: RestaurantId, name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
            last_selected_at: None,
            is_active: true,
            note: None,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), RestaurantValidationError> {
        if self.name.trim().is_empty() {
            return Err(RestaurantValidationError::BlankName);
        }
        Ok(())
    }

    /// Returns whether this restaurant has an open selection cycle.
    pub fn has_been_selected(&self) -> bool {
        self.last_selected_at.is_some()
    }

    /// Records a selection at `at_ms`, opening a new selection cycle.
    pub fn mark_selected(&mut self, at_ms: i64) {
        self.last_selected_at = Some(at_ms);
    }

    /// Clears the selection timestamp so the restaurant is eligible again.
    pub fn reset_cooldown(&mut self) {
        self.last_selected_at = None;
    }
}
