use serde::{Deserialize, Serialize};

use crate::capabilities::{FetchError, ImageCacheResult, TimerId};
use crate::config::CoreConfig;
use crate::model::{CollectionSummary, MountId, ScreenKind};
use crate::preferences::TripPreferences;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Noop,

    Configure(CoreConfig),

    // Collections screens
    CollectionsMounted { kind: ScreenKind },
    CollectionsUnmounted,
    CollectionPicked { country: String },
    SelectionCleared,

    // Itinerary presentation
    ItineraryMounted,
    ItineraryUnmounted,
    CityOpened { city_id: String },

    // Questionnaire / itinerary hand-off
    TripPreferencesSubmitted(TripPreferences),
    TripPreferencesRequested,

    // Capability responses; the shell never sends these directly.
    #[serde(skip)]
    SummariesFetched {
        mount: MountId,
        result: Result<Vec<CollectionSummary>, FetchError>,
    },
    #[serde(skip)]
    SeedCompleted(Result<(), FetchError>),
    #[serde(skip)]
    TimerFired { id: TimerId },
    #[serde(skip)]
    ThumbnailResolved {
        mount: MountId,
        country: String,
        result: ImageCacheResult,
    },
    #[serde(skip)]
    TripPreferencesLoaded(Option<TripPreferences>),
    #[serde(skip)]
    TripPreferencesStored { ok: bool },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure(_) => "configure",
            Self::CollectionsMounted { .. } => "collections_mounted",
            Self::CollectionsUnmounted => "collections_unmounted",
            Self::CollectionPicked { .. } => "collection_picked",
            Self::SelectionCleared => "selection_cleared",
            Self::ItineraryMounted => "itinerary_mounted",
            Self::ItineraryUnmounted => "itinerary_unmounted",
            Self::CityOpened { .. } => "city_opened",
            Self::TripPreferencesSubmitted(_) => "trip_preferences_submitted",
            Self::TripPreferencesRequested => "trip_preferences_requested",
            Self::SummariesFetched { .. } => "summaries_fetched",
            Self::SeedCompleted(_) => "seed_completed",
            Self::TimerFired { .. } => "timer_fired",
            Self::ThumbnailResolved { .. } => "thumbnail_resolved",
            Self::TripPreferencesLoaded(_) => "trip_preferences_loaded",
            Self::TripPreferencesStored { .. } => "trip_preferences_stored",
        }
    }
}
