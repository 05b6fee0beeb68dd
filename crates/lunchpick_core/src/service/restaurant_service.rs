//! Restaurant list use-case service.
//!
//! # Responsibility
//! - Add restaurants behind the duplicate-name policy.
//! - Edit notes and the active flag.
//! - Delete restaurants (and their ratings) behind an explicit confirmation.
//!
//! # Invariants
//! - Adding a name whose normalized form already exists always fails.
//! - A near-duplicate name is only added through `confirm_add`.
//! - Confirmation tokens are re-checked against current state on use.

use crate::config::PickerConfig;
use crate::matching::duplicate::{check_duplicate, DuplicateCheck, FuzzyWarning};
use crate::matching::similarity::normalize;
use crate::model::now_epoch_ms;
use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::repo::restaurant_repo::RestaurantRepository;
use crate::service::error::{ConflictError, LunchError, ValidationError};
use log::{info, warn};

/// Name that passed the add checks and is waiting to be inserted.
///
/// Only issued by `RestaurantService::check_add`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an add is only performed by passing this to `confirm_add`"]
pub struct PendingAdd {
    name: String,
}

impl PendingAdd {
    /// Trimmed display name that will be stored.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of the first phase of adding a restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddCheck {
    /// No similar name exists; pass `pending` to `confirm_add`.
    Ready(PendingAdd),
    /// A similar name exists; ask the user before calling `confirm_add`.
    NeedsConfirmation {
        warning: FuzzyWarning,
        pending: PendingAdd,
    },
}

/// Result of the one-shot `add_restaurant` helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(Restaurant),
    /// Near-duplicate found and the caller did not confirm; nothing written.
    Aborted { warning: FuzzyWarning },
}

/// Confirmation token for deleting one restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "nothing is deleted until this is passed to `delete_restaurant`"]
pub struct DeleteConfirmation {
    restaurant_id: RestaurantId,
    name: String,
    rating_count: u64,
}

impl DeleteConfirmation {
    pub fn restaurant_id(&self) -> RestaurantId {
        self.restaurant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ratings that existed when the delete was requested.
    pub fn rating_count(&self) -> u64 {
        self.rating_count
    }
}

/// Restaurant list service facade.
pub struct RestaurantService<R: RestaurantRepository> {
    repo: R,
    fuzzy_limit: usize,
}

impl<R: RestaurantRepository> RestaurantService<R> {
    /// Creates a service with default duplicate-detection settings.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, &PickerConfig::default())
    }

    /// Creates a service using `fuzzy_distance_limit` from config.
    pub fn with_config(repo: R, config: &PickerConfig) -> Self {
        Self {
            repo,
            fuzzy_limit: config.fuzzy_distance_limit,
        }
    }

    /// Lists every restaurant, active or not, ordered by name.
    pub fn list_restaurants(&self) -> Result<Vec<Restaurant>, LunchError> {
        Ok(self.repo.list_restaurants()?)
    }

    /// Lists only restaurants whose active flag is set.
    pub fn list_active(&self) -> Result<Vec<Restaurant>, LunchError> {
        let mut restaurants = self.repo.list_restaurants()?;
        restaurants.retain(|restaurant| restaurant.is_active);
        Ok(restaurants)
    }

    /// Loads one restaurant or fails with `NotFound`.
    pub fn get_restaurant(&self, id: RestaurantId) -> Result<Restaurant, LunchError> {
        self.repo
            .get_restaurant(id)?
            .ok_or(LunchError::NotFound(id))
    }

    /// Phase one of adding: validates the name and applies the duplicate
    /// policy without writing anything.
    ///
    /// # Errors
    /// - `Validation(EmptyName)` for blank input.
    /// - `Conflict(DuplicateName)` when the normalized name already exists.
    pub fn check_add(&self, name: &str) -> Result<AddCheck, LunchError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || normalize(trimmed).is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let existing = self.repo.list_restaurants()?;
        let pending = PendingAdd {
            name: trimmed.to_string(),
        };
        match check_duplicate(trimmed, &existing, self.fuzzy_limit) {
            DuplicateCheck::Exact {
                existing_id,
                existing_name,
            } => {
                info!(
                    "event=restaurant_add module=service status=skip reason=duplicate_name existing_id={existing_id}"
                );
                Err(ConflictError::DuplicateName {
                    existing_id,
                    existing_name,
                }
                .into())
            }
            DuplicateCheck::Similar(warning) => {
                Ok(AddCheck::NeedsConfirmation { warning, pending })
            }
            DuplicateCheck::Unique => Ok(AddCheck::Ready(pending)),
        }
    }

    /// Phase two of adding: inserts the pending name.
    ///
    /// The exact-duplicate rule is checked again, since the list may have
    /// changed since `check_add`.
    pub fn confirm_add(&self, pending: PendingAdd) -> Result<Restaurant, LunchError> {
        let existing = self.repo.list_restaurants()?;
        if let DuplicateCheck::Exact {
            existing_id,
            existing_name,
        } = check_duplicate(&pending.name, &existing, self.fuzzy_limit)
        {
            return Err(ConflictError::DuplicateName {
                existing_id,
                existing_name,
            }
            .into());
        }

        let restaurant = Restaurant::new(pending.name, now_epoch_ms());
        if let Err(err) = self.repo.create_restaurant(&restaurant) {
            warn!("event=restaurant_add module=service status=error error={err}");
            return Err(err.into());
        }
        info!(
            "event=restaurant_add module=service status=ok restaurant_id={}",
            restaurant.id
        );
        Ok(restaurant)
    }

    /// One-shot add. A near-duplicate is inserted only when `confirm_fuzzy`
    /// is set; otherwise the add is aborted without error.
    pub fn add_restaurant(
        &self,
        name: &str,
        confirm_fuzzy: bool,
    ) -> Result<AddOutcome, LunchError> {
        match self.check_add(name)? {
            AddCheck::Ready(pending) => Ok(AddOutcome::Added(self.confirm_add(pending)?)),
            AddCheck::NeedsConfirmation { pending, .. } if confirm_fuzzy => {
                Ok(AddOutcome::Added(self.confirm_add(pending)?))
            }
            AddCheck::NeedsConfirmation { warning, .. } => {
                info!(
                    "event=restaurant_add module=service status=skip reason=unconfirmed_similar_name existing_id={}",
                    warning.existing_id
                );
                Ok(AddOutcome::Aborted { warning })
            }
        }
    }

    /// Replaces the note. Blank input clears it.
    pub fn update_note(
        &self,
        id: RestaurantId,
        note: Option<&str>,
    ) -> Result<Restaurant, LunchError> {
        let note = note.map(str::trim).filter(|value| !value.is_empty());
        self.repo.update_note(id, note)?;
        self.get_restaurant(id)
    }

    /// Sets the caller-side active flag.
    pub fn set_active(&self, id: RestaurantId, is_active: bool) -> Result<Restaurant, LunchError> {
        self.repo.set_active(id, is_active)?;
        self.get_restaurant(id)
    }

    /// Phase one of deleting: describes what will be removed.
    pub fn request_delete(&self, id: RestaurantId) -> Result<DeleteConfirmation, LunchError> {
        let restaurant = self.get_restaurant(id)?;
        let rating_count = self.repo.rating_count(id)?;
        Ok(DeleteConfirmation {
            restaurant_id: restaurant.id,
            name: restaurant.name,
            rating_count,
        })
    }

    /// Phase two of deleting: removes the ratings, then the restaurant.
    ///
    /// Returns how many ratings were removed.
    pub fn delete_restaurant(&self, confirmation: DeleteConfirmation) -> Result<u64, LunchError> {
        let id = confirmation.restaurant_id;
        match self.repo.delete_restaurant(id) {
            Ok(removed) => {
                info!(
                    "event=restaurant_delete module=service status=ok restaurant_id={id} ratings_removed={removed}"
                );
                Ok(removed)
            }
            Err(err) => {
                warn!(
                    "event=restaurant_delete module=service status=error restaurant_id={id} error={err}"
                );
                Err(err.into())
            }
        }
    }
}
