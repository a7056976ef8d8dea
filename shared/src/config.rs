use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{ApiEndpoints, HttpError};
use crate::model::ScreenKind;
use crate::poller::{PollPolicy, DEFAULT_POLL_INTERVAL_MS, RICH_MAX_ATTEMPTS, SIMPLE_MAX_ATTEMPTS};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const MAX_CONFIGURED_ATTEMPTS: u32 = 100;
pub const MAX_CONFIGURED_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base URL: {0}")]
    ApiBase(#[from] HttpError),

    #[error("{screen}: max_attempts must be between 1 and {max}, got {got}")]
    Attempts {
        screen: &'static str,
        got: u32,
        max: u32,
    },

    #[error("{screen}: interval_ms must be between 1 and {max}, got {got}")]
    Interval {
        screen: &'static str,
        got: u64,
        max: u64,
    },
}

/// How one kind of collections screen behaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenProfile {
    /// Request demo data before the first fetch.
    pub seed: bool,
    /// Resolve per-country thumbnails after a populated fetch.
    pub thumbnails: bool,
    /// Show placeholder collections while the first fetch is pending.
    pub placeholder_while_loading: bool,
    pub policy: PollPolicy,
}

impl ScreenProfile {
    pub fn home() -> Self {
        Self {
            seed: true,
            thumbnails: true,
            placeholder_while_loading: false,
            policy: PollPolicy::new(
                RICH_MAX_ATTEMPTS,
                Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            ),
        }
    }

    pub fn home_simple() -> Self {
        Self {
            seed: false,
            thumbnails: false,
            placeholder_while_loading: true,
            policy: PollPolicy::new(
                SIMPLE_MAX_ATTEMPTS,
                Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            ),
        }
    }

    pub fn trip_list() -> Self {
        Self {
            seed: false,
            thumbnails: true,
            placeholder_while_loading: false,
            policy: PollPolicy::single_shot(),
        }
    }

    fn validate(&self, screen: &'static str) -> Result<(), ConfigError> {
        let attempts = self.policy.max_attempts;
        if attempts == 0 || attempts > MAX_CONFIGURED_ATTEMPTS {
            return Err(ConfigError::Attempts {
                screen,
                got: attempts,
                max: MAX_CONFIGURED_ATTEMPTS,
            });
        }
        let interval = self.policy.interval_ms;
        if interval == 0 || interval > MAX_CONFIGURED_INTERVAL_MS {
            return Err(ConfigError::Interval {
                screen,
                got: interval,
                max: MAX_CONFIGURED_INTERVAL_MS,
            });
        }
        Ok(())
    }
}

/// Shell-supplied configuration. Missing fields take the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub api_base_url: String,
    pub home: ScreenProfile,
    pub home_simple: ScreenProfile,
    pub trip_list: ScreenProfile,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            home: ScreenProfile::home(),
            home_simple: ScreenProfile::home_simple(),
            trip_list: ScreenProfile::trip_list(),
        }
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoints()?;
        self.home.validate(ScreenKind::Home.name())?;
        self.home_simple.validate(ScreenKind::HomeSimple.name())?;
        self.trip_list.validate(ScreenKind::TripList.name())?;
        Ok(())
    }

    pub fn endpoints(&self) -> Result<ApiEndpoints, HttpError> {
        ApiEndpoints::new(&self.api_base_url)
    }

    pub fn profile(&self, kind: ScreenKind) -> &ScreenProfile {
        match kind {
            ScreenKind::Home => &self.home,
            ScreenKind::HomeSimple => &self.home_simple,
            ScreenKind::TripList => &self.trip_list,
        }
    }
}
