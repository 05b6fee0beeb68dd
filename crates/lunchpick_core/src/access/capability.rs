//! Admin unlock gate and the capability token it issues.

use crate::config::PickerConfig;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Proof that the holder unlocked admin operations.
#[derive(Debug)]
pub struct AdminCapability {
    _sealed: (),
}

/// Admin unlock failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No admin secret is configured.
    AdminDisabled,
    /// Supplied secret does not match.
    InvalidPassword,
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AdminDisabled => write!(f, "admin unlock is disabled"),
            Self::InvalidPassword => write!(f, "wrong admin password"),
        }
    }
}

impl Error for AccessError {}

/// Issues admin capabilities to callers who present the configured secret.
#[derive(Clone)]
pub struct AdminGate {
    secret: Option<String>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.secret.is_some())
            .finish()
    }
}

impl AdminGate {
    /// Creates a gate. `None` disables unlocking entirely.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|value| !value.is_empty()),
        }
    }

    /// Creates a gate from `admin_password` in config.
    pub fn from_config(config: &PickerConfig) -> Self {
        Self::new(config.admin_password.clone())
    }

    /// Returns whether an admin secret is configured.
    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Exchanges the admin secret for a capability token.
    pub fn unlock(&self, attempt: &str) -> Result<AdminCapability, AccessError> {
        let Some(secret) = self.secret.as_deref() else {
            warn!("event=admin_unlock module=access status=error error_code=admin_disabled");
            return Err(AccessError::AdminDisabled);
        };
        if !constant_time_eq(secret.as_bytes(), attempt.as_bytes()) {
            warn!("event=admin_unlock module=access status=error error_code=invalid_password");
            return Err(AccessError::InvalidPassword);
        }
        Ok(AdminCapability { _sealed: () })
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}
