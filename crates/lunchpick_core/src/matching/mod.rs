//! Restaurant name normalization and near-duplicate detection.
//!
//! # Responsibility
//! - Reduce names to a comparison key that ignores case, spacing and
//!   punctuation variance.
//! - Measure edit distance between keys.
//! - Classify a new name against existing restaurants.
//!
//! Everything here is pure; persistence happens in the service layer.

pub mod duplicate;
pub mod similarity;
