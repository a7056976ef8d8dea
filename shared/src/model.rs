use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::TimerIds;
use crate::config::CoreConfig;
use crate::preferences::TripPreferences;
use crate::screen::CollectionsScreen;
use crate::seeder::SeedSession;
use crate::transition::{ItineraryScene, SceneClock};

/// One destination's aggregate saved-content count.
///
/// Instances are replaced wholesale on every successful fetch; they are never
/// merged or mutated in place.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub country: String,
    pub count: u32,
}

impl CollectionSummary {
    pub fn new(country: impl Into<String>, count: u32) -> Self {
        Self {
            country: country.into(),
            count,
        }
    }
}

/// Shown when the summary source never produces rows.
pub fn placeholder_collections() -> Vec<CollectionSummary> {
    vec![
        CollectionSummary::new("Japan", 12),
        CollectionSummary::new("Bali", 8),
        CollectionSummary::new("Goa", 5),
    ]
}

/// Identifies one mount of a screen. Results tagged with an older mount are stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountId(pub u64);

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mount-{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Home,
    HomeSimple,
    TripList,
}

impl ScreenKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::HomeSimple => "home_simple",
            Self::TripList => "trip_list",
        }
    }
}

/// Session state owned by the core. Each screen's state is owned by the
/// screen value stored here and dropped on unmount.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Model {
    pub config: CoreConfig,

    pub seed_session: SeedSession,
    pub timer_ids: TimerIds,
    next_mount: u64,

    pub collections: Option<CollectionsScreen>,
    pub itinerary: Option<SceneClock<ItineraryScene>>,

    pub trip_preferences: Option<TripPreferences>,
    pub preferences_loaded: bool,
}

impl Model {
    pub fn next_mount_id(&mut self) -> MountId {
        self.next_mount += 1;
        MountId(self.next_mount)
    }
}
