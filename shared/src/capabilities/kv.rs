use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

/// Keys the core reads and writes. Raw names are shared with the web shell's
/// `localStorage`, so they are not namespaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKey {
    TripPreferences,
}

impl StorageKey {
    pub const fn raw(self) -> &'static str {
        match self {
            Self::TripPreferences => "tripPreferences",
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("serialization error for '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("storage error: {message}")]
    Storage { message: String },
}

pub fn encode<T: Serialize>(key: StorageKey, value: &T) -> Result<Vec<u8>, KvError> {
    let data = serde_json::to_vec(value).map_err(|e| KvError::Serialization {
        key: key.raw().to_string(),
        message: e.to_string(),
    })?;
    if data.len() > MAX_VALUE_SIZE {
        return Err(KvError::ValueTooLarge {
            size: data.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(data)
}

pub fn decode<T: DeserializeOwned>(key: StorageKey, data: &[u8]) -> Result<T, KvError> {
    if data.len() > MAX_VALUE_SIZE {
        return Err(KvError::ValueTooLarge {
            size: data.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    serde_json::from_slice(data).map_err(|e| KvError::Serialization {
        key: key.raw().to_string(),
        message: e.to_string(),
    })
}
