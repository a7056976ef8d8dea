mod http;
mod image_cache;
mod kv;
mod timer;

pub use self::http::{
    seed_from_response, summaries_from_response, ApiEndpoints, FetchError, HttpError,
    ValidatedUrl,
};
pub use self::image_cache::{
    validate_query, ImageCache, ImageCacheError, ImageCacheOperation, ImageCacheResult,
};
pub use self::kv::{decode, encode, KvError, StorageKey};
pub use self::timer::{Timer, TimerId, TimerIds, TimerOperation, TimerOutput};

// Crux's built-in Render is all the view refresh we need.
pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::app::App;
use crate::event::Event;

// Field names mirror the capability type names so the derived `Effect`
// variants read `Http`, `KeyValue`, `Render`, `Timer` and `ImageCache`.
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub key_value: KeyValue<Event>,
    pub render: Render<Event>,
    pub timer: Timer<Event>,
    pub image_cache: ImageCache<Event>,
}
