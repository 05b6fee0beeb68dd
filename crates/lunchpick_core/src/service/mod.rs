//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the caller-facing operations: add,
//!   delete, note edits, random selection, cooldown reset, rating.
//! - Run every validation and state check before any write.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - Services hold no cached restaurant state between calls; every operation
//!   re-reads what it needs.

pub mod error;
pub mod rating_service;
pub mod restaurant_service;
pub mod selection_service;
