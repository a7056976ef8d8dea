use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::CollectionSummary;

pub const MAX_URL_LENGTH: usize = 2048;
pub const COUNTRIES_PATH: &str = "api/countries";
pub const SEED_PATH: &str = "api/demo/seed";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    scheme: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();
        let parsed = Self::validate(&url)?;

        let scheme = parsed.scheme().to_lowercase();
        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl {
                url: Self::truncate_url(&url),
                reason: "missing host".to_string(),
            })?
            .to_lowercase();

        Ok(Self {
            url: parsed.to_string(),
            scheme,
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn validate(url: &str) -> Result<Url, HttpError> {
        if url.trim().is_empty() {
            return Err(HttpError::InvalidUrl {
                url: url.to_string(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
            url: Self::truncate_url(url),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            });
        }

        if parsed.host_str().is_none() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "URL must have a host".to_string(),
            });
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "credentials in URL are not allowed".to_string(),
            });
        }

        Ok(parsed)
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
            format!("{}...", &url[..cut])
        }
    }
}

/// The demo API the collection screens talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: Url,
}

impl ApiEndpoints {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        let validated = ValidatedUrl::new(base_url)?;
        let mut base = Url::parse(validated.as_str()).map_err(|e| HttpError::InvalidUrl {
            url: validated.as_str().to_string(),
            reason: e.to_string(),
        })?;

        // `Url::join` drops the last path segment unless it ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    pub fn countries(&self) -> Result<String, HttpError> {
        self.join(COUNTRIES_PATH)
    }

    pub fn seed(&self) -> Result<String, HttpError> {
        self.join(SEED_PATH)
    }

    fn join(&self, path: &str) -> Result<String, HttpError> {
        self.base
            .join(path)
            .map(String::from)
            .map_err(|e| HttpError::InvalidUrl {
                url: format!("{}{path}", self.base),
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failure of one call to the Remote Summary Source.
///
/// Every variant is terminal for the poller: only an empty, successful
/// response is ever retried.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("HTTP error {status}")]
    Status { status: u16 },

    #[error("endpoint misconfigured: {0}")]
    Endpoint(#[from] HttpError),
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

pub fn summaries_from_response(
    result: crux_http::Result<crux_http::Response<Vec<CollectionSummary>>>,
) -> Result<Vec<CollectionSummary>, FetchError> {
    let mut response = result.map_err(|e| FetchError::transport(e.to_string()))?;
    let status: u16 = response.status().into();
    if !(200..300).contains(&status) {
        return Err(FetchError::Status { status });
    }
    // No body at all means the source has nothing indexed yet.
    Ok(response.take_body().unwrap_or_default())
}

pub fn seed_from_response(
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> Result<(), FetchError> {
    let response = result.map_err(|e| FetchError::transport(e.to_string()))?;
    let status: u16 = response.status().into();
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Status { status })
    }
}
