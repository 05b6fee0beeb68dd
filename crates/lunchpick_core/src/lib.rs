//! Core decision logic for the team lunch picker.
//!
//! This crate owns the rules: duplicate-name detection when adding
//! restaurants, cooldown-aware random selection, and once-per-cycle rating
//! submissions. Storage is SQLite behind repository traits.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod matching;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{AccessError, AdminCapability, AdminGate};
pub use config::{ConfigError, PickerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use matching::duplicate::{check_duplicate, DuplicateCheck, FuzzyWarning};
pub use matching::similarity::{distance, normalize};
pub use model::rating::{Rating, RatingId, RatingPolicy, RatingValidationError};
pub use model::restaurant::{Restaurant, RestaurantId, RestaurantValidationError};
pub use repo::rating_repo::{RatingRepository, SqliteRatingRepository};
pub use repo::restaurant_repo::{RestaurantRepository, SqliteRestaurantRepository};
pub use repo::{RepoError, RepoResult};
pub use service::error::{ConflictError, LunchError, StateError, ValidationError};
pub use service::rating_service::{AverageRating, RatingService, RestaurantSummary};
pub use service::restaurant_service::{
    AddCheck, AddOutcome, DeleteConfirmation, PendingAdd, RestaurantService,
};
pub use service::selection_service::{
    cooldown_remaining_ms, eligible_candidates, is_eligible, pick_random, SelectionService,
    MS_PER_DAY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
