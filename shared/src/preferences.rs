use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capabilities::{self, KvError, StorageKey};

pub const DEFAULT_TRAVELERS: u32 = 2;
pub const UNSPECIFIED_HOME: &str = "Not specified";

/// Trip preferences written by the questionnaire flows and read by the
/// itinerary flows. Stored as camelCase JSON under a single key; no schema
/// version, last write wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPreferences {
    pub destination: String,
    /// `yyyy-MM-dd`, or empty when no dates were picked.
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default = "default_travelers")]
    pub travelers: u32,
    #[serde(default)]
    pub duration: u32,
    #[serde(default = "default_home")]
    pub home_location: String,
}

fn default_travelers() -> u32 {
    DEFAULT_TRAVELERS
}

fn default_home() -> String {
    UNSPECIFIED_HOME.to_string()
}

impl TripPreferences {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            start_date: String::new(),
            end_date: String::new(),
            travelers: DEFAULT_TRAVELERS,
            duration: 0,
            home_location: default_home(),
        }
    }

    #[must_use]
    pub fn with_dates(mut self, start: impl Into<String>, end: impl Into<String>, duration: u32) -> Self {
        self.start_date = start.into();
        self.end_date = end.into();
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_travelers(mut self, travelers: Option<u32>) -> Self {
        self.travelers = travelers.filter(|t| *t > 0).unwrap_or(DEFAULT_TRAVELERS);
        self
    }

    #[must_use]
    pub fn with_home_location(mut self, home: Option<String>) -> Self {
        self.home_location = home
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(default_home);
        self
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, KvError> {
        capabilities::encode(StorageKey::TripPreferences, self)
    }

    /// Outcome of a key-value read. A failed read is treated like absent data.
    pub fn from_read<E: std::fmt::Debug>(result: Result<Option<Vec<u8>>, E>) -> Option<Self> {
        match result {
            Ok(stored) => Self::from_stored(stored.as_deref()),
            Err(error) => {
                let error = KvError::Storage {
                    message: format!("{error:?}"),
                };
                warn!(%error, "reading trip preferences failed");
                None
            }
        }
    }

    /// Absent or malformed data means "no preferences set", never an error.
    pub fn from_stored(stored: Option<&[u8]>) -> Option<Self> {
        let bytes = stored?;
        match capabilities::decode(StorageKey::TripPreferences, bytes) {
            Ok(preferences) => Some(preferences),
            Err(error) => {
                warn!(%error, "ignoring unreadable trip preferences");
                None
            }
        }
    }
}
