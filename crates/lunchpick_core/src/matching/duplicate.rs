//! Duplicate-name policy applied when adding a restaurant.
//!
//! # Invariants
//! - An exact normalized match always wins over any fuzzy match.
//! - A fuzzy match requires `0 < distance < limit`.
//! - Among fuzzy matches the smallest distance wins; ties keep input order.

use crate::matching::similarity::{distance, normalize};
use crate::model::restaurant::{Restaurant, RestaurantId};
use std::fmt::{Display, Formatter};

/// Default exclusive upper bound for fuzzy matches.
pub const DEFAULT_FUZZY_DISTANCE_LIMIT: usize = 3;

/// Near-duplicate warning surfaced before an add is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyWarning {
    /// Name the caller tried to add.
    pub candidate: String,
    pub existing_id: RestaurantId,
    pub existing_name: String,
    /// Edit distance between the normalized names.
    pub distance: usize,
}

impl Display for FuzzyWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" looks similar to existing restaurant \"{}\"",
            self.candidate, self.existing_name
        )
    }
}

/// Outcome of comparing a candidate name against existing restaurants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateCheck {
    /// No existing name is close enough to matter.
    Unique,
    /// Normalized names are identical.
    Exact {
        existing_id: RestaurantId,
        existing_name: String,
    },
    /// Names differ by a small edit distance.
    Similar(FuzzyWarning),
}

/// Classifies `candidate` against `existing`.
///
/// `fuzzy_limit` is the exclusive distance bound for a fuzzy match.
pub fn check_duplicate(
    candidate: &str,
    existing: &[Restaurant],
    fuzzy_limit: usize,
) -> DuplicateCheck {
    let key = normalize(candidate);
    let mut closest: Option<(usize, &Restaurant)> = None;

    for restaurant in existing {
        let existing_key = normalize(&restaurant.name);
        if existing_key == key {
            return DuplicateCheck::Exact {
                existing_id: restaurant.id,
                existing_name: restaurant.name.clone(),
            };
        }

        let d = distance(&key, &existing_key);
        if d > 0 && d < fuzzy_limit && closest.map_or(true, |(best, _)| d < best) {
            closest = Some((d, restaurant));
        }
    }

    match closest {
        Some((d, restaurant)) => DuplicateCheck::Similar(FuzzyWarning {
            candidate: candidate.to_string(),
            existing_id: restaurant.id,
            existing_name: restaurant.name.clone(),
            distance: d,
        }),
        None => DuplicateCheck::Unique,
    }
}
