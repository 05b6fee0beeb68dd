//! Picker configuration.
//!
//! # Responsibility
//! - Hold the tunable policy values: cooldown, rating domain, score range,
//!   fuzzy-match bound and the admin secret.
//! - Parse and validate JSON configuration documents.
//!
//! # Invariants
//! - A validated config always has `score_min <= score_max`.
//! - `rating_email_domain` starts with `@` and names a domain.
//! - No admin secret is compiled in; `admin_password = None` disables unlock.

use crate::matching::duplicate::DEFAULT_FUZZY_DISTANCE_LIMIT;
use crate::model::rating::RatingPolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_COOLDOWN_DAYS: u32 = 30;
pub const DEFAULT_RATING_EMAIL_DOMAIN: &str = "@soundthinking.com";
pub const DEFAULT_SCORE_MIN: i32 = 0;
pub const DEFAULT_SCORE_MAX: i32 = 10;

/// Tunable policy for the lunch picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickerConfig {
    /// Days a picked restaurant stays ineligible.
    pub cooldown_days: u32,
    /// Required submitter email suffix, including `@`.
    pub rating_email_domain: String,
    pub score_min: i32,
    pub score_max: i32,
    /// Names closer than this edit distance trigger a confirmation.
    pub fuzzy_distance_limit: usize,
    pub admin_password: Option<String>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            cooldown_days: DEFAULT_COOLDOWN_DAYS,
            rating_email_domain: DEFAULT_RATING_EMAIL_DOMAIN.to_string(),
            score_min: DEFAULT_SCORE_MIN,
            score_max: DEFAULT_SCORE_MAX,
            fuzzy_distance_limit: DEFAULT_FUZZY_DISTANCE_LIMIT,
            admin_password: None,
        }
    }
}

/// Configuration load/validation failures.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl PickerConfig {
    /// Parses and validates a JSON document. Missing keys take defaults.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&source)
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.score_min > self.score_max {
            return Err(ConfigError::Invalid(format!(
                "score_min {} exceeds score_max {}",
                self.score_min, self.score_max
            )));
        }

        let domain = self.rating_email_domain.trim();
        if !domain.starts_with('@') || domain.len() < 2 || domain != self.rating_email_domain {
            return Err(ConfigError::Invalid(format!(
                "rating_email_domain `{}` must look like `@example.com`",
                self.rating_email_domain
            )));
        }

        if self.fuzzy_distance_limit == 0 {
            return Err(ConfigError::Invalid(
                "fuzzy_distance_limit must be at least 1".to_string(),
            ));
        }

        if matches!(self.admin_password.as_deref(), Some(secret) if secret.is_empty()) {
            return Err(ConfigError::Invalid(
                "admin_password must not be empty; omit it to disable admin unlock".to_string(),
            ));
        }

        Ok(())
    }

    /// Rating submission rules derived from this config.
    pub fn rating_policy(&self) -> RatingPolicy {
        RatingPolicy {
            email_suffix: self.rating_email_domain.clone(),
            score_min: self.score_min,
            score_max: self.score_max,
        }
    }
}
