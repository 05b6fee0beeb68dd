//! Domain records for restaurants and their ratings.
//!
//! # Responsibility
//! - Define the canonical shapes shared by repositories and services.
//! - Keep record-level validation next to the record.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - All timestamps are Unix epoch milliseconds.

pub mod rating;
pub mod restaurant;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch milliseconds.
///
/// Clocks set before the Unix epoch collapse to `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
