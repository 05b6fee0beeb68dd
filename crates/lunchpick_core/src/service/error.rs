//! Error kinds surfaced by the lunch picker services.
//!
//! Validation and state errors are raised before any write is attempted.
//! Store errors wrap the repository error unmodified.

use crate::model::rating::RatingValidationError;
use crate::model::restaurant::{RestaurantId, RestaurantValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller input is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty, whitespace-only, or has no letters or digits.
    EmptyName,
    InvalidDomain { expected_suffix: String },
    InvalidScore { score: i32, min: i32, max: i32 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "restaurant name must not be empty"),
            Self::InvalidDomain { expected_suffix } => {
                write!(f, "invalid email domain; must end with {expected_suffix}")
            }
            Self::InvalidScore { score, min, max } => {
                write!(f, "invalid score {score}; must be between {min} and {max}")
            }
        }
    }
}

impl From<RatingValidationError> for ValidationError {
    fn from(value: RatingValidationError) -> Self {
        match value {
            RatingValidationError::InvalidDomain { expected_suffix } => {
                Self::InvalidDomain { expected_suffix }
            }
            RatingValidationError::InvalidScore { score, min, max } => {
                Self::InvalidScore { score, min, max }
            }
        }
    }
}

/// Operation is not allowed in the current stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Rating attempted before the restaurant was ever picked.
    NotYetSelected(RestaurantId),
    /// Submitter already rated this restaurant since its last selection.
    AlreadyRatedThisCycle(RestaurantId),
    /// Every restaurant is cooling down.
    NoEligibleCandidates,
    /// Another session recorded a selection between read and write.
    SelectionConflict(RestaurantId),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotYetSelected(_) => {
                write!(f, "restaurant must be selected before it can be rated")
            }
            Self::AlreadyRatedThisCycle(_) => write!(
                f,
                "already rated this restaurant; rate again after it is selected again"
            ),
            Self::NoEligibleCandidates => {
                write!(f, "no eligible restaurants (all are cooling down)")
            }
            Self::SelectionConflict(id) => {
                write!(f, "restaurant {id} was selected concurrently; pick again")
            }
        }
    }
}

/// Write would duplicate existing data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    DuplicateName {
        existing_id: RestaurantId,
        existing_name: String,
    },
}

impl Display for ConflictError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName { existing_name, .. } => {
                write!(f, "restaurant \"{existing_name}\" already exists")
            }
        }
    }
}

/// Service-level error for every caller-facing operation.
#[derive(Debug)]
pub enum LunchError {
    Validation(ValidationError),
    State(StateError),
    Conflict(ConflictError),
    NotFound(RestaurantId),
    /// Persistence failure, passed through unmodified.
    Store(RepoError),
}

impl LunchError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::EmptyName) => "empty_name",
            Self::Validation(ValidationError::InvalidDomain { .. }) => "invalid_domain",
            Self::Validation(ValidationError::InvalidScore { .. }) => "invalid_score",
            Self::State(StateError::NotYetSelected(_)) => "not_yet_selected",
            Self::State(StateError::AlreadyRatedThisCycle(_)) => "already_rated_this_cycle",
            Self::State(StateError::NoEligibleCandidates) => "no_eligible_candidates",
            Self::State(StateError::SelectionConflict(_)) => "selection_conflict",
            Self::Conflict(ConflictError::DuplicateName { .. }) => "duplicate_name",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store_error",
        }
    }
}

impl Display for LunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::State(err) => write!(f, "{err}"),
            Self::Conflict(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "restaurant not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LunchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LunchError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::RestaurantNotFound(id) => Self::NotFound(id),
            RepoError::Validation(RestaurantValidationError::BlankName) => {
                Self::Validation(ValidationError::EmptyName)
            }
            other => Self::Store(other),
        }
    }
}

impl From<ValidationError> for LunchError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RatingValidationError> for LunchError {
    fn from(value: RatingValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<StateError> for LunchError {
    fn from(value: StateError) -> Self {
        Self::State(value)
    }
}

impl From<ConflictError> for LunchError {
    fn from(value: ConflictError) -> Self {
        Self::Conflict(value)
    }
}
