//! Thumbnail resolution for collection cards.
//!
//! Lookups fan out through the image cache capability and are joined into a
//! [`ThumbnailMap`] only when every lookup has answered. A miss or a failed
//! lookup simply leaves the country out of the map; the display image then
//! falls back to a bundled asset.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capabilities::ImageCacheResult;
use crate::model::CollectionSummary;

pub const GENERIC_THUMBNAIL: &str = "assets/thumbs/default.jpg";
pub const DATA_URI_JPEG_PREFIX: &str = "data:image/jpeg;base64,";

const TUNED_QUERIES: &[(&str, &str)] = &[
    ("Bali", "Bali turquoise beach aerial"),
    ("Japan", "Japan mountain lake sunrise"),
    ("Goa", "Goa beach sunset palm trees"),
];

const STATIC_THUMBNAILS: &[(&str, &str)] = &[
    ("Japan", "assets/thumbs/japan.jpg"),
    ("Bali", "assets/thumbs/bali.jpg"),
    ("Goa", "assets/thumbs/goa.jpg"),
];

pub fn query_for_country(country: &str) -> String {
    TUNED_QUERIES
        .iter()
        .find(|(name, _)| *name == country)
        .map_or_else(|| format!("{country} travel landscape"), |(_, q)| (*q).to_string())
}

pub fn static_thumbnail(country: &str) -> Option<&'static str> {
    STATIC_THUMBNAILS
        .iter()
        .find(|(name, _)| *name == country)
        .map(|(_, path)| *path)
}

/// Something the shell can put in an `<img>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageSource {
    DataUri(String),
    BundledAsset(String),
}

impl ImageSource {
    /// Raw base64 payloads become JPEG data URIs; data URIs pass through.
    pub fn from_payload(payload: &str) -> Self {
        if payload.starts_with("data:") {
            Self::DataUri(payload.to_string())
        } else {
            Self::DataUri(format!("{DATA_URI_JPEG_PREFIX}{payload}"))
        }
    }

    pub fn bundled(path: &str) -> Self {
        Self::BundledAsset(path.to_string())
    }
}

/// First candidate that yields a value, in priority order.
pub fn first_defined<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

/// Country name to resolved image payload. Rebuilt wholesale per fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailMap {
    entries: HashMap<String, String>,
}

impl ThumbnailMap {
    pub fn get(&self, country: &str) -> Option<&str> {
        self.entries.get(country).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, country: &str) -> bool {
        self.entries.contains_key(country)
    }

    /// Resolved payload, else the country's bundled asset, else the generic one.
    pub fn display_image(&self, country: &str) -> ImageSource {
        first_defined([
            self.get(country).map(ImageSource::from_payload),
            static_thumbnail(country).map(ImageSource::bundled),
        ])
        .unwrap_or_else(|| ImageSource::bundled(GENERIC_THUMBNAIL))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThumbnailLookup {
    pub country: String,
    pub query: String,
}

/// One in-flight fan-out of thumbnail lookups.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ThumbnailBatch {
    pending: BTreeSet<String>,
    resolved: HashMap<String, String>,
}

impl ThumbnailBatch {
    /// Plans one lookup per distinct country, in display order.
    pub fn plan(collections: &[CollectionSummary]) -> (Self, Vec<ThumbnailLookup>) {
        let mut batch = Self::default();
        let mut lookups = Vec::with_capacity(collections.len());
        for summary in collections {
            if batch.pending.insert(summary.country.clone()) {
                lookups.push(ThumbnailLookup {
                    country: summary.country.clone(),
                    query: query_for_country(&summary.country),
                });
            }
        }
        (batch, lookups)
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Records one lookup. Returns `true` once the whole batch has answered.
    pub fn record(&mut self, country: &str, result: ImageCacheResult) -> bool {
        if !self.pending.remove(country) {
            debug!(country, "ignoring thumbnail for a country not in this batch");
            return self.is_complete();
        }
        match result {
            Ok(Some(payload)) if !payload.is_empty() => {
                self.resolved.insert(country.to_string(), payload);
            }
            Ok(_) => debug!(country, "no cached thumbnail"),
            Err(error) => warn!(country, %error, "thumbnail lookup failed, using fallback"),
        }
        self.is_complete()
    }

    pub fn finish(self) -> ThumbnailMap {
        ThumbnailMap {
            entries: self.resolved,
        }
    }
}
