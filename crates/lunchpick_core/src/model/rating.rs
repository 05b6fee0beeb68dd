//! Rating domain model and submission rules.
//!
//! # Responsibility
//! - Define the rating record written by a validated submission.
//! - Own the submitter-domain and score-range rules.
//!
//! # Invariants
//! - Ratings are immutable once stored.
//! - `user_email` is stored trimmed and lower-cased.
//! - At most one rating per submitter exists inside one selection cycle.

use crate::model::restaurant::RestaurantId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a rating row.
pub type RatingId = Uuid;

/// One submitted score for one restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub restaurant_id: RestaurantId,
    pub user_email: String,
    /// Serialized as `rating` to match the stored column name.
    #[serde(rename = "rating")]
    pub score: i32,
    /// Epoch ms submission timestamp.
    pub created_at: i64,
}

impl Rating {
    /// Creates a rating with a generated ID.
    pub fn new(
        restaurant_id: RestaurantId,
        user_email: impl Into<String>,
        score: i32,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            restaurant_id,
            user_email: user_email.into(),
            score,
            created_at,
        }
    }
}

/// Rule violations for a rating submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingValidationError {
    /// Email does not belong to the organizational domain.
    InvalidDomain { expected_suffix: String },
    /// Score is outside the accepted inclusive range.
    InvalidScore { score: i32, min: i32, max: i32 },
}

impl Display for RatingValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDomain { expected_suffix } => {
                write!(f, "invalid email domain; must end with {expected_suffix}")
            }
            Self::InvalidScore { score, min, max } => {
                write!(f, "invalid score {score}; must be between {min} and {max}")
            }
        }
    }
}

impl Error for RatingValidationError {}

/// Submission rules applied before any rating is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingPolicy {
    /// Required email suffix including the `@`, e.g. `@example.com`.
    pub email_suffix: String,
    pub score_min: i32,
    pub score_max: i32,
}

impl RatingPolicy {
    /// Normalizes an email and checks it against the organizational suffix.
    ///
    /// Returns the trimmed, lower-cased address on success. The local part
    /// must be non-empty.
    pub fn check_email(&self, email: &str) -> Result<String, RatingValidationError> {
        let normalized = email.trim().to_lowercase();
        let suffix = self.email_suffix.to_lowercase();
        let has_local_part = normalized.len() > suffix.len();
        if !has_local_part || !normalized.ends_with(suffix.as_str()) {
            return Err(RatingValidationError::InvalidDomain {
                expected_suffix: self.email_suffix.clone(),
            });
        }
        Ok(normalized)
    }

    /// Checks that `score` lies in `score_min..=score_max`.
    pub fn check_score(&self, score: i32) -> Result<(), RatingValidationError> {
        if !(self.score_min..=self.score_max).contains(&score) {
            return Err(RatingValidationError::InvalidScore {
                score,
                min: self.score_min,
                max: self.score_max,
            });
        }
        Ok(())
    }
}
