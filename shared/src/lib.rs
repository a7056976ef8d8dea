#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod config;
pub mod enrichment;
pub mod event;
pub mod model;
pub mod poller;
pub mod preferences;
pub mod screen;
pub mod seeder;
pub mod selection;
pub mod thumbnails;
pub mod transition;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{CoreConfig, ScreenProfile};
pub use crux_core::App as CruxApp;
pub use event::Event;
pub use model::{CollectionSummary, Model, MountId, ScreenKind};
pub use preferences::TripPreferences;
pub use screen::{CollectionCard, CollectionsView};
pub use transition::ItineraryScene;

use crate::capabilities::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Server,
    Configuration,
    Storage,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Server => "SERVER_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.internal_message {
            Some(internal) => write!(f, "[{}] {} ({internal})", self.code(), self.message),
            None => write!(f, "[{}] {}", self.code(), self.message),
        }
    }
}

impl std::error::Error for AppError {}

impl From<&FetchError> for AppError {
    fn from(e: &FetchError) -> Self {
        let kind = match e {
            FetchError::Transport { .. } => ErrorKind::Network,
            FetchError::Status { .. } => ErrorKind::Server,
            FetchError::Endpoint(_) => ErrorKind::Configuration,
        };
        Self::new(kind, "Failed to load your collections").with_internal(e.to_string())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub collections: Option<CollectionsView>,
    pub itinerary_scene: Option<ItineraryScene>,
    pub trip_preferences: Option<TripPreferences>,
}

pub mod app {
    use std::collections::VecDeque;
    use std::time::Duration;

    use tracing::{debug, info, warn};

    use super::{Event, Model, ViewModel};
    use crate::capabilities::{
        seed_from_response, summaries_from_response, Capabilities, FetchError, StorageKey,
    };
    use crate::model::{CollectionSummary, MountId};
    use crate::preferences::TripPreferences;
    use crate::screen::{CollectionsScreen, ScreenCommand};
    use crate::seeder::Seeder;
    use crate::transition::{ClockStep, ItineraryScene, SceneClock, CITY_OPEN_DELAY_MS};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn seed_demo_data(model: &mut Model, caps: &Capabilities) {
            let url = match model.config.endpoints().and_then(|api| api.seed()) {
                Ok(url) => url,
                Err(error) => {
                    warn!(%error, "cannot seed demo data");
                    return;
                }
            };
            Seeder::new(&mut model.seed_session).seed_if_needed(|| {
                caps.http
                    .post(url)
                    .send(|result| Event::SeedCompleted(seed_from_response(result)));
            });
        }

        fn fetch_summaries(
            mount: MountId,
            model: &Model,
            caps: &Capabilities,
        ) -> Result<(), FetchError> {
            let url = model.config.endpoints()?.countries()?;
            debug!(%mount, %url, "fetching collection summaries");
            caps.http
                .get(url)
                .expect_json::<Vec<CollectionSummary>>()
                .send(move |result| Event::SummariesFetched {
                    mount,
                    result: summaries_from_response(result),
                });
            Ok(())
        }

        fn run_screen_commands(
            commands: Vec<ScreenCommand>,
            mount: MountId,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            let mut queue: VecDeque<ScreenCommand> = commands.into();
            while let Some(command) = queue.pop_front() {
                match command {
                    ScreenCommand::Fetch => {
                        if let Err(error) = Self::fetch_summaries(mount, model, caps) {
                            // Nothing went out; fail the attempt right here.
                            if let Some(screen) = model.collections.as_mut() {
                                queue.extend(screen.on_summaries(Err(error), &mut model.timer_ids));
                            }
                        }
                    }
                    ScreenCommand::StartTimer { id, delay } => {
                        caps.timer.start(id, delay, |id| Event::TimerFired { id });
                    }
                    ScreenCommand::CancelTimer { id } => caps.timer.cancel(id),
                    ScreenCommand::LookupThumbnail(lookup) => {
                        let country = lookup.country;
                        caps.image_cache.get(lookup.query, move |result| {
                            Event::ThumbnailResolved {
                                mount,
                                country,
                                result,
                            }
                        });
                    }
                }
            }
        }

        fn unmount_collections(model: &mut Model, caps: &Capabilities) {
            if let Some(mut screen) = model.collections.take() {
                let commands = screen.unmount();
                Self::run_screen_commands(commands, screen.mount_id(), model, caps);
            }
        }

        fn apply_clock_step(step: ClockStep, caps: &Capabilities) {
            if let Some(id) = step.cancel {
                caps.timer.cancel(id);
            }
            if let Some((id, delay)) = step.start {
                caps.timer.start(id, delay, |id| Event::TimerFired { id });
            }
        }

        fn unmount_itinerary(model: &mut Model, caps: &Capabilities) {
            if let Some(mut clock) = model.itinerary.take() {
                if let Some(id) = clock.cancel() {
                    caps.timer.cancel(id);
                }
            }
        }

        fn store_preferences(preferences: &TripPreferences, caps: &Capabilities) {
            match preferences.to_bytes() {
                Ok(bytes) => {
                    caps.key_value.set(
                        StorageKey::TripPreferences.raw().to_string(),
                        bytes,
                        |result| Event::TripPreferencesStored { ok: result.is_ok() },
                    );
                }
                Err(error) => warn!(%error, "cannot encode trip preferences"),
            }
        }

        fn load_preferences(caps: &Capabilities) {
            caps.key_value.get(StorageKey::TripPreferences.raw().to_string(), |result| {
                Event::TripPreferencesLoaded(TripPreferences::from_read(result))
            });
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(event = event.name(), "update");

            match event {
                Event::Noop => {}

                Event::Configure(config) => match config.validate() {
                    Ok(()) => {
                        info!(api = %config.api_base_url, "configuration applied");
                        model.config = config;
                    }
                    Err(error) => warn!(%error, "rejecting configuration, keeping previous"),
                },

                Event::CollectionsMounted { kind } => {
                    Self::unmount_collections(model, caps);

                    let profile = model.config.profile(kind).clone();
                    if profile.seed {
                        Self::seed_demo_data(model, caps);
                    }
                    let mount = model.next_mount_id();
                    let (screen, commands) = CollectionsScreen::mount(kind, mount, profile);
                    model.collections = Some(screen);
                    Self::run_screen_commands(commands, mount, model, caps);
                    caps.render.render();
                }

                Event::CollectionsUnmounted => {
                    Self::unmount_collections(model, caps);
                    caps.render.render();
                }

                Event::SummariesFetched { mount, result } => {
                    let Some(screen) = model
                        .collections
                        .as_mut()
                        .filter(|s| s.mount_id() == mount)
                    else {
                        debug!(%mount, "dropping summaries for a screen that is gone");
                        return;
                    };
                    let commands = screen.on_summaries(result, &mut model.timer_ids);
                    Self::run_screen_commands(commands, mount, model, caps);
                    caps.render.render();
                }

                Event::ThumbnailResolved {
                    mount,
                    country,
                    result,
                } => {
                    let Some(screen) = model
                        .collections
                        .as_mut()
                        .filter(|s| s.mount_id() == mount)
                    else {
                        debug!(%mount, %country, "dropping thumbnail for a screen that is gone");
                        return;
                    };
                    screen.on_thumbnail(&country, result);
                    caps.render.render();
                }

                Event::SeedCompleted(result) => match result {
                    Ok(()) => debug!("demo data seeded"),
                    Err(error) => warn!(%error, "demo seeding failed, polling continues"),
                },

                Event::TimerFired { id } => {
                    if let Some(screen) = model.collections.as_mut() {
                        if let Some(commands) = screen.on_timer(id) {
                            let mount = screen.mount_id();
                            Self::run_screen_commands(commands, mount, model, caps);
                            caps.render.render();
                            return;
                        }
                    }
                    if let Some(clock) = model.itinerary.as_mut() {
                        if let Some(step) = clock.on_timer(id, &mut model.timer_ids) {
                            Self::apply_clock_step(step, caps);
                            caps.render.render();
                            return;
                        }
                    }
                    debug!(%id, "ignoring timer with no owner");
                }

                Event::CollectionPicked { country } => {
                    if let Some(screen) = model.collections.as_mut() {
                        if screen.pick(&country) {
                            caps.render.render();
                        }
                    }
                }

                Event::SelectionCleared => {
                    if let Some(screen) = model.collections.as_mut() {
                        screen.clear_selection();
                        caps.render.render();
                    }
                }

                Event::ItineraryMounted => {
                    Self::unmount_itinerary(model, caps);
                    let (clock, step) = SceneClock::start(ItineraryScene::Vault, &mut model.timer_ids);
                    model.itinerary = Some(clock);
                    Self::apply_clock_step(step, caps);
                    caps.render.render();
                }

                Event::ItineraryUnmounted => {
                    Self::unmount_itinerary(model, caps);
                    caps.render.render();
                }

                Event::CityOpened { city_id } => {
                    let Some(clock) = model.itinerary.as_mut() else {
                        debug!(%city_id, "city opened with no itinerary mounted");
                        return;
                    };
                    let step = clock.go_to_after(
                        ItineraryScene::City { city_id },
                        Duration::from_millis(CITY_OPEN_DELAY_MS),
                        &mut model.timer_ids,
                    );
                    Self::apply_clock_step(step, caps);
                }

                Event::TripPreferencesSubmitted(preferences) => {
                    info!(destination = %preferences.destination, "storing trip preferences");
                    Self::store_preferences(&preferences, caps);
                    model.trip_preferences = Some(preferences);
                    caps.render.render();
                }

                Event::TripPreferencesRequested => Self::load_preferences(caps),

                Event::TripPreferencesLoaded(preferences) => {
                    model.trip_preferences = preferences;
                    model.preferences_loaded = true;
                    caps.render.render();
                }

                Event::TripPreferencesStored { ok } => {
                    if !ok {
                        warn!("trip preferences were not persisted");
                    }
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel {
                collections: model.collections.as_ref().map(CollectionsScreen::view),
                itinerary_scene: model.itinerary.as_ref().map(|c| c.current().clone()),
                trip_preferences: model.trip_preferences.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_maps_to_network_error() {
        let err = AppError::from(&FetchError::transport("connection refused"));
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn status_failure_keeps_details_internal() {
        let err = AppError::from(&FetchError::Status { status: 503 });
        assert_eq!(err.message, "Failed to load your collections");
        assert_eq!(err.code(), "SERVER_ERROR");
        assert_eq!(err.internal_message.as_deref(), Some("HTTP error 503"));
    }
}
