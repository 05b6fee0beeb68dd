//! Rating submission and aggregate use-case service.
//!
//! # Responsibility
//! - Enforce domain-restricted, once-per-cycle rating submissions.
//! - Provide per-restaurant rating lists and averages.
//!
//! # Invariants
//! - Checks run in a fixed order and stop at the first failure: email
//!   domain, score range, restaurant selected, duplicate in cycle.
//! - No rating row is written unless every check passed.
//! - A stored rating is stamped strictly after the cycle start, so a clock
//!   reading at or before `last_selected_at` still lands in the current cycle.
//! - Averages span all cycles; zero ratings yields `AverageRating::Unrated`.

use crate::config::PickerConfig;
use crate::logging::mask_email;
use crate::model::now_epoch_ms;
use crate::model::rating::{Rating, RatingPolicy};
use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::repo::rating_repo::RatingRepository;
use crate::repo::restaurant_repo::RestaurantRepository;
use crate::service::error::{LunchError, StateError};
use crate::service::selection_service::cooldown_remaining_ms;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Display value for a restaurant's mean score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageRating {
    /// No ratings exist yet.
    Unrated,
    /// Mean score rounded to one decimal place.
    Rated(f64),
}

impl AverageRating {
    /// Averages `scores`, rounding to one decimal place.
    pub fn from_scores(scores: &[i32]) -> Self {
        if scores.is_empty() {
            return Self::Unrated;
        }
        let total: i64 = scores.iter().map(|score| i64::from(*score)).sum();
        let mean = total as f64 / scores.len() as f64;
        Self::Rated((mean * 10.0).round() / 10.0)
    }

    /// Numeric value, if any ratings exist.
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Unrated => None,
            Self::Rated(value) => Some(value),
        }
    }
}

impl Display for AverageRating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrated => write!(f, "No ratings yet"),
            Self::Rated(value) => write!(f, "{value:.1}"),
        }
    }
}

/// One restaurant with its rating aggregate and cooldown state.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantSummary {
    pub restaurant: Restaurant,
    pub average: AverageRating,
    pub rating_count: usize,
    /// Milliseconds until eligible again; `None` when eligible now.
    pub cooldown_remaining_ms: Option<i64>,
}

/// Rating service facade over restaurant and rating repositories.
pub struct RatingService<R: RestaurantRepository, G: RatingRepository> {
    restaurants: R,
    ratings: G,
    policy: RatingPolicy,
}

impl<R: RestaurantRepository, G: RatingRepository> RatingService<R, G> {
    /// Creates a service with the default domain and 0-10 score range.
    pub fn new(restaurants: R, ratings: G) -> Self {
        Self::with_config(restaurants, ratings, &PickerConfig::default())
    }

    /// Creates a service using the rating policy from config.
    pub fn with_config(restaurants: R, ratings: G, config: &PickerConfig) -> Self {
        Self {
            restaurants,
            ratings,
            policy: config.rating_policy(),
        }
    }

    /// Submits one rating at the current time.
    pub fn submit_rating(
        &self,
        restaurant_id: RestaurantId,
        email: &str,
        score: i32,
    ) -> Result<Rating, LunchError> {
        self.submit_rating_at(restaurant_id, email, score, now_epoch_ms())
    }

    /// Submits one rating stamped with `now_ms`, or one millisecond after
    /// the selection when `now_ms` is not later than it.
    ///
    /// # Errors
    /// - `Validation(InvalidDomain)` / `Validation(InvalidScore)`.
    /// - `NotFound` when the restaurant does not exist.
    /// - `State(NotYetSelected)` before the first selection.
    /// - `State(AlreadyRatedThisCycle)` for a repeat within one cycle.
    pub fn submit_rating_at(
        &self,
        restaurant_id: RestaurantId,
        email: &str,
        score: i32,
        now_ms: i64,
    ) -> Result<Rating, LunchError> {
        let result = self.validate_and_insert(restaurant_id, email, score, now_ms);
        match &result {
            Ok(rating) => info!(
                "event=rating_submit module=service status=ok restaurant_id={restaurant_id} rating_id={} submitter={}",
                rating.id,
                mask_email(&rating.user_email)
            ),
            Err(err @ LunchError::Store(_)) => warn!(
                "event=rating_submit module=service status=error restaurant_id={restaurant_id} error_code={} error={err}",
                err.code()
            ),
            Err(err) => info!(
                "event=rating_submit module=service status=rejected restaurant_id={restaurant_id} error_code={} submitter={}",
                err.code(),
                mask_email(email)
            ),
        }
        result
    }

    fn validate_and_insert(
        &self,
        restaurant_id: RestaurantId,
        email: &str,
        score: i32,
        now_ms: i64,
    ) -> Result<Rating, LunchError> {
        let email = self.policy.check_email(email)?;
        self.policy.check_score(score)?;

        let restaurant = self
            .restaurants
            .get_restaurant(restaurant_id)?
            .ok_or(LunchError::NotFound(restaurant_id))?;
        let Some(cycle_start) = restaurant.last_selected_at else {
            return Err(StateError::NotYetSelected(restaurant_id).into());
        };

        let in_cycle = self
            .ratings
            .count_ratings_since(restaurant_id, &email, cycle_start)?;
        if in_cycle > 0 {
            return Err(StateError::AlreadyRatedThisCycle(restaurant_id).into());
        }

        let created_at = now_ms.max(cycle_start.saturating_add(1));
        let rating = Rating::new(restaurant_id, email, score, created_at);
        self.ratings.create_rating(&rating)?;
        Ok(rating)
    }

    /// Lists every rating for one restaurant, oldest first.
    pub fn get_ratings(&self, restaurant_id: RestaurantId) -> Result<Vec<Rating>, LunchError> {
        Ok(self.ratings.list_ratings(restaurant_id)?)
    }

    /// Mean of every rating for the restaurant, regardless of cycle.
    pub fn average_rating(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<AverageRating, LunchError> {
        let scores: Vec<i32> = self
            .ratings
            .list_ratings(restaurant_id)?
            .iter()
            .map(|rating| rating.score)
            .collect();
        Ok(AverageRating::from_scores(&scores))
    }

    /// Loads ratings for every restaurant. The first failure aborts the load.
    pub fn ratings_by_restaurant(
        &self,
    ) -> Result<BTreeMap<RestaurantId, Vec<Rating>>, LunchError> {
        let restaurants = self.restaurants.list_restaurants()?;
        let mut by_restaurant = BTreeMap::new();
        for restaurant in restaurants {
            let ratings = self.ratings.list_ratings(restaurant.id)?;
            by_restaurant.insert(restaurant.id, ratings);
        }
        Ok(by_restaurant)
    }

    /// Builds display rows for every restaurant, ordered by name.
    pub fn restaurant_summaries(
        &self,
        cooldown_days: u32,
        now_ms: i64,
    ) -> Result<Vec<RestaurantSummary>, LunchError> {
        let restaurants = self.restaurants.list_restaurants()?;
        let mut summaries = Vec::with_capacity(restaurants.len());
        for restaurant in restaurants {
            let scores: Vec<i32> = self
                .ratings
                .list_ratings(restaurant.id)?
                .iter()
                .map(|rating| rating.score)
                .collect();
            summaries.push(RestaurantSummary {
                average: AverageRating::from_scores(&scores),
                rating_count: scores.len(),
                cooldown_remaining_ms: cooldown_remaining_ms(&restaurant, cooldown_days, now_ms),
                restaurant,
            });
        }
        Ok(summaries)
    }
}
