//! Random lunch selection and cooldown management.
//!
//! # Responsibility
//! - Decide which restaurants are out of cooldown.
//! - Pick one uniformly at random and record the pick.
//! - Reset cooldowns on request.
//!
//! # Invariants
//! - Elapsed days are `(now - last_selected_at) / MS_PER_DAY` in raw
//!   milliseconds, not calendar days.
//! - A winner is returned only after its selection timestamp is stored.
//! - Nothing is written when no restaurant is eligible.
//! - The stored write is a compare-and-swap on `last_selected_at`, so two
//!   sessions cannot both win with the same restaurant.

use crate::access::AdminCapability;
use crate::config::PickerConfig;
use crate::model::now_epoch_ms;
use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::repo::restaurant_repo::RestaurantRepository;
use crate::service::error::{LunchError, StateError};
use log::{info, warn};
use rand::Rng;

/// Milliseconds in one cooldown day.
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Returns whether `restaurant` may be picked at `now_ms`.
///
/// Never-selected restaurants are always eligible. A selection timestamp in
/// the future keeps the restaurant ineligible.
pub fn is_eligible(restaurant: &Restaurant, cooldown_days: u32, now_ms: i64) -> bool {
    cooldown_remaining_ms(restaurant, cooldown_days, now_ms).is_none()
}

/// Milliseconds left before `restaurant` becomes eligible, or `None` when it
/// already is.
pub fn cooldown_remaining_ms(
    restaurant: &Restaurant,
    cooldown_days: u32,
    now_ms: i64,
) -> Option<i64> {
    let last_selected_at = restaurant.last_selected_at?;
    let cooldown_ms = i64::from(cooldown_days).saturating_mul(MS_PER_DAY);
    let elapsed_ms = now_ms.saturating_sub(last_selected_at);
    if elapsed_ms >= cooldown_ms {
        None
    } else {
        Some(cooldown_ms - elapsed_ms)
    }
}

/// Filters `restaurants` down to the eligible ones, keeping input order.
///
/// The active flag is not consulted.
pub fn eligible_candidates(
    restaurants: &[Restaurant],
    cooldown_days: u32,
    now_ms: i64,
) -> Vec<&Restaurant> {
    restaurants
        .iter()
        .filter(|restaurant| is_eligible(restaurant, cooldown_days, now_ms))
        .collect()
}

/// Picks one candidate uniformly at random.
pub fn pick_random<'a, G: Rng + ?Sized>(
    candidates: &[&'a Restaurant],
    rng: &mut G,
) -> Option<&'a Restaurant> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

/// Selection service facade.
pub struct SelectionService<R: RestaurantRepository> {
    repo: R,
    default_cooldown_days: u32,
}

impl<R: RestaurantRepository> SelectionService<R> {
    /// Creates a service with the default 30-day cooldown.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, &PickerConfig::default())
    }

    /// Creates a service whose default cooldown comes from config.
    pub fn with_config(repo: R, config: &PickerConfig) -> Self {
        Self {
            repo,
            default_cooldown_days: config.cooldown_days,
        }
    }

    /// Picks a random eligible restaurant and records it as selected now.
    ///
    /// Returns `Ok(None)` when every restaurant is cooling down.
    pub fn select_random<G: Rng + ?Sized>(
        &self,
        admin: &AdminCapability,
        cooldown_days: u32,
        rng: &mut G,
    ) -> Result<Option<Restaurant>, LunchError> {
        self.select_random_at(admin, cooldown_days, now_epoch_ms(), rng)
    }

    /// `select_random` with the configured cooldown.
    pub fn select_with_default_cooldown<G: Rng + ?Sized>(
        &self,
        admin: &AdminCapability,
        rng: &mut G,
    ) -> Result<Option<Restaurant>, LunchError> {
        self.select_random(admin, self.default_cooldown_days, rng)
    }

    /// `select_random` that reports an empty pool as
    /// `StateError::NoEligibleCandidates`.
    pub fn pick_lunch<G: Rng + ?Sized>(
        &self,
        admin: &AdminCapability,
        cooldown_days: u32,
        rng: &mut G,
    ) -> Result<Restaurant, LunchError> {
        self.select_random(admin, cooldown_days, rng)?
            .ok_or(LunchError::State(StateError::NoEligibleCandidates))
    }

    /// `select_random` evaluated at an explicit instant.
    pub fn select_random_at<G: Rng + ?Sized>(
        &self,
        _admin: &AdminCapability,
        cooldown_days: u32,
        now_ms: i64,
        rng: &mut G,
    ) -> Result<Option<Restaurant>, LunchError> {
        let restaurants = self.repo.list_restaurants()?;
        let candidates = eligible_candidates(&restaurants, cooldown_days, now_ms);
        let Some(winner) = pick_random(&candidates, rng) else {
            info!(
                "event=lunch_select module=service status=skip reason=no_eligible_candidates total={} cooldown_days={cooldown_days}",
                restaurants.len()
            );
            return Ok(None);
        };

        let recorded = self
            .repo
            .mark_selected(winner.id, winner.last_selected_at, now_ms)
            .map_err(|err| {
                warn!(
                    "event=lunch_select module=service status=error restaurant_id={} error={err}",
                    winner.id
                );
                LunchError::from(err)
            })?;
        if !recorded {
            warn!(
                "event=lunch_select module=service status=error restaurant_id={} error_code=selection_conflict",
                winner.id
            );
            return Err(StateError::SelectionConflict(winner.id).into());
        }

        info!(
            "event=lunch_select module=service status=ok restaurant_id={} eligible={} total={}",
            winner.id,
            candidates.len(),
            restaurants.len()
        );
        let mut winner = winner.clone();
        winner.mark_selected(now_ms);
        Ok(Some(winner))
    }

    /// Clears the selection timestamp so the restaurant is eligible again.
    pub fn reset_cooldown(
        &self,
        _admin: &AdminCapability,
        id: RestaurantId,
    ) -> Result<(), LunchError> {
        self.repo.clear_last_selected(id)?;
        info!("event=cooldown_reset module=service status=ok restaurant_id={id}");
        Ok(())
    }
}
