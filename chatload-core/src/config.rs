use crate::{
    DEFAULT_BASE_URL, DEFAULT_MAX_DELAY, DEFAULT_MESSAGES_PER_USER, DEFAULT_MIN_DELAY,
    DEFAULT_ROOM_ID, DEFAULT_USERS,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Credential must be formatted as <username>:<password>")]
    InvalidCredential,

    #[error("At least one user must be configured")]
    NoUsers,

    #[error("Minimum delay ({min}) is greater than maximum delay ({max})")]
    InvertedDelay { min: String, max: String },

    #[error("Unable to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Username and password of a simulated user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl FromStr for Credential {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((username, password)) if !username.is_empty() => {
                Ok(Credential::new(username, password))
            }
            _ => Err(ConfigError::InvalidCredential),
        }
    }
}

/// Bounds (inclusive) of the random pause a user takes between two messages.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub min: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// A range that never pauses.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl fmt::Display for DelayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}]",
            humantime::format_duration(self.min),
            humantime::format_duration(self.max)
        )
    }
}

/// Static parameters of a single run.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub base_url: String,
    pub room_id: String,
    pub messages_per_user: usize,
    pub users: Vec<Credential>,
    pub delay: DelayRange,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(rename = "request_timeout_ms")]
    pub request_timeout: Option<Duration>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            room_id: DEFAULT_ROOM_ID.to_string(),
            messages_per_user: DEFAULT_MESSAGES_PER_USER,
            users: DEFAULT_USERS
                .iter()
                .map(|(username, password)| Credential::new(*username, *password))
                .collect(),
            delay: DelayRange::default(),
            request_timeout: None,
        }
    }
}

impl TestConfig {
    /// Reads a JSON configuration file. Missing fields take their default value.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Reading configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users.is_empty() {
            return Err(ConfigError::NoUsers);
        }

        if self.delay.min > self.delay.max {
            return Err(ConfigError::InvertedDelay {
                min: humantime::format_duration(self.delay.min).to_string(),
                max: humantime::format_duration(self.delay.max).to_string(),
            });
        }

        Ok(())
    }
}
