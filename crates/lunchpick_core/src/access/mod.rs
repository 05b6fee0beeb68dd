//! Admin capability gate.
//!
//! Selection and cooldown reset require an `AdminCapability`. The token is
//! issued by `AdminGate::unlock` and cannot be constructed elsewhere, so
//! holding one is proof the caller passed the gate. There is no session
//! state: callers keep the token for as long as their session lasts.

mod capability;

pub use capability::{AccessError, AdminCapability, AdminGate};
