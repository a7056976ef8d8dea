use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_QUERY_LENGTH: usize = 256;

/// Best-effort cache-or-fetch image lookup, keyed by a free-text query.
///
/// The shell owns the cache and the upstream photo search; the core only
/// asks and accepts whatever comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageCacheOperation {
    Get { query: String },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageCacheError {
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("upstream lookup failed: {message}")]
    Upstream { message: String },

    #[error("cache storage unavailable")]
    StorageUnavailable,
}

/// `Ok(None)` is a clean miss; `Ok(Some(_))` is a base64 payload or a data URI.
pub type ImageCacheResult = Result<Option<String>, ImageCacheError>;

impl Operation for ImageCacheOperation {
    type Output = ImageCacheResult;
}

pub struct ImageCache<Ev> {
    context: CapabilityContext<ImageCacheOperation, Ev>,
}

impl<Ev> Capability<Ev> for ImageCache<Ev> {
    type Operation = ImageCacheOperation;
    type MappedSelf<MappedEv> = ImageCache<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        ImageCache::new(self.context.map_event(f))
    }
}

impl<Ev> ImageCache<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<ImageCacheOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, query: String, make_event: F)
    where
        F: FnOnce(ImageCacheResult) -> Ev + Send + 'static,
    {
        if let Err(e) = validate_query(&query) {
            let context = self.context.clone();
            self.context.spawn(async move {
                context.update_app(make_event(Err(e)));
            });
            return;
        }

        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(ImageCacheOperation::Get { query })
                .await;
            context.update_app(make_event(output));
        });
    }
}

pub fn validate_query(query: &str) -> Result<(), ImageCacheError> {
    if query.trim().is_empty() {
        return Err(ImageCacheError::InvalidQuery {
            reason: "query cannot be empty".to_string(),
        });
    }
    if query.len() > MAX_QUERY_LENGTH {
        return Err(ImageCacheError::InvalidQuery {
            reason: format!("query exceeds maximum length of {MAX_QUERY_LENGTH} bytes"),
        });
    }
    if query.chars().any(char::is_control) {
        return Err(ImageCacheError::InvalidQuery {
            reason: "query contains control characters".to_string(),
        });
    }
    Ok(())
}
