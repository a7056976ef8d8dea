//! One mounted "country collections" screen: poller, thumbnails and selection
//! wired together.
//!
//! The screen returns [`ScreenCommand`]s instead of touching capabilities so
//! that every transition is testable without a shell.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{FetchError, ImageCacheResult, TimerId, TimerIds};
use crate::config::ScreenProfile;
use crate::model::{placeholder_collections, CollectionSummary, MountId, ScreenKind};
use crate::poller::{PollPhase, PollStep, Poller};
use crate::selection::Selection;
use crate::thumbnails::{ImageSource, ThumbnailBatch, ThumbnailLookup, ThumbnailMap};
use crate::AppError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScreenCommand {
    Fetch,
    StartTimer { id: TimerId, delay: Duration },
    CancelTimer { id: TimerId },
    LookupThumbnail(ThumbnailLookup),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionsScreen {
    kind: ScreenKind,
    mount: MountId,
    profile: ScreenProfile,
    poller: Poller,
    collections: Vec<CollectionSummary>,
    showing_placeholders: bool,
    thumbnails: ThumbnailMap,
    batch: Option<ThumbnailBatch>,
    selection: Selection,
    error: Option<AppError>,
}

impl CollectionsScreen {
    pub fn mount(
        kind: ScreenKind,
        mount: MountId,
        profile: ScreenProfile,
    ) -> (Self, Vec<ScreenCommand>) {
        let (collections, showing_placeholders) = if profile.placeholder_while_loading {
            (placeholder_collections(), true)
        } else {
            (Vec::new(), false)
        };

        let mut screen = Self {
            kind,
            mount,
            poller: Poller::new(profile.policy),
            profile,
            collections,
            showing_placeholders,
            thumbnails: ThumbnailMap::default(),
            batch: None,
            selection: Selection::default(),
            error: None,
        };

        info!(screen = kind.name(), %mount, "collections screen mounted");
        let commands = match screen.poller.start() {
            Some(step) => screen.apply(step),
            None => Vec::new(),
        };
        (screen, commands)
    }

    pub fn mount_id(&self) -> MountId {
        self.mount
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn collections(&self) -> &[CollectionSummary] {
        &self.collections
    }

    pub fn thumbnails(&self) -> &ThumbnailMap {
        &self.thumbnails
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn is_showing_placeholders(&self) -> bool {
        self.showing_placeholders
    }

    /// Loading covers both the polling and the thumbnail join.
    pub fn is_loading(&self) -> bool {
        self.poller.is_loading() || self.batch.is_some()
    }

    pub fn on_summaries(
        &mut self,
        result: Result<Vec<CollectionSummary>, FetchError>,
        timer_ids: &mut TimerIds,
    ) -> Vec<ScreenCommand> {
        match self.poller.on_response(result, timer_ids) {
            Some(step) => self.apply(step),
            None => Vec::new(),
        }
    }

    /// `None` when the timer does not belong to this screen.
    pub fn on_timer(&mut self, id: TimerId) -> Option<Vec<ScreenCommand>> {
        self.poller.on_timer(id).map(|step| self.apply(step))
    }

    pub fn on_thumbnail(&mut self, country: &str, result: ImageCacheResult) {
        let Some(batch) = self.batch.as_mut() else {
            debug!(country, "thumbnail arrived with no batch in flight");
            return;
        };
        if batch.record(country, result) {
            if let Some(batch) = self.batch.take() {
                self.thumbnails = batch.finish();
                info!(
                    screen = self.kind.name(),
                    resolved = self.thumbnails.len(),
                    "thumbnails resolved"
                );
            }
        }
    }

    /// Releases the pending retry timer, if any. Must run on every teardown.
    pub fn unmount(&mut self) -> Vec<ScreenCommand> {
        info!(screen = self.kind.name(), mount = %self.mount, "collections screen unmounted");
        self.batch = None;
        self.poller
            .cancel()
            .map(|id| vec![ScreenCommand::CancelTimer { id }])
            .unwrap_or_default()
    }

    /// Focus a collection on screen. Unknown countries are ignored.
    pub fn pick(&mut self, country: &str) -> bool {
        if !self.collections.iter().any(|c| c.country == country) {
            debug!(country, "ignoring pick of a collection not on screen");
            return false;
        }
        self.selection.pick(country);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn view(&self) -> CollectionsView {
        let picked = self.selection.picked();
        let cards = self
            .collections
            .iter()
            .map(|c| CollectionCard {
                country: c.country.clone(),
                count: c.count,
                initials: initials(&c.country),
                image: self
                    .profile
                    .thumbnails
                    .then(|| self.thumbnails.display_image(&c.country)),
                dimmed: crate::selection::is_dimmed(&c.country, picked),
                picked: picked == Some(c.country.as_str()),
            })
            .collect();

        CollectionsView {
            screen: self.kind,
            loading: self.is_loading(),
            phase: self.poller.phase().clone(),
            attempts: self.poller.attempts(),
            error: self.error.as_ref().map(|e| e.message.clone()),
            total_count: self.collections.iter().map(|c| u64::from(c.count)).sum(),
            country_count: self.collections.len(),
            showing_placeholders: self.showing_placeholders,
            picked: picked.map(str::to_string),
            cards,
        }
    }

    fn apply(&mut self, step: PollStep) -> Vec<ScreenCommand> {
        match step {
            PollStep::Fetch => vec![ScreenCommand::Fetch],
            PollStep::ScheduleRetry { timer, delay } => {
                vec![ScreenCommand::StartTimer { id: timer, delay }]
            }
            PollStep::Populated(data) => self.replace_collections(data),
            PollStep::Exhausted => {
                self.collections = placeholder_collections();
                self.showing_placeholders = true;
                self.thumbnails = ThumbnailMap::default();
                self.drop_stale_selection();
                Vec::new()
            }
            PollStep::Failed(error) => {
                let error = AppError::from(&error);
                warn!(screen = self.kind.name(), code = error.code(), %error, "collections unavailable");
                self.error = Some(error);
                Vec::new()
            }
        }
    }

    fn replace_collections(&mut self, data: Vec<CollectionSummary>) -> Vec<ScreenCommand> {
        self.collections = data;
        self.showing_placeholders = false;
        self.error = None;
        self.drop_stale_selection();

        if !self.profile.thumbnails {
            return Vec::new();
        }

        let (batch, lookups) = ThumbnailBatch::plan(&self.collections);
        if !batch.is_complete() {
            self.batch = Some(batch);
        }
        lookups
            .into_iter()
            .map(ScreenCommand::LookupThumbnail)
            .collect()
    }

    fn drop_stale_selection(&mut self) {
        let stale = self
            .selection
            .picked()
            .is_some_and(|p| !self.collections.iter().any(|c| c.country == p));
        if stale {
            self.selection.clear();
        }
    }
}

fn initials(country: &str) -> String {
    country.chars().take(2).collect::<String>().to_uppercase()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionCard {
    pub country: String,
    pub count: u32,
    pub initials: String,
    pub image: Option<ImageSource>,
    pub dimmed: bool,
    pub picked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionsView {
    pub screen: ScreenKind,
    pub loading: bool,
    pub phase: PollPhase,
    pub attempts: u32,
    /// Plain inline message; codes and internals stay in the logs.
    pub error: Option<String>,
    pub total_count: u64,
    pub country_count: usize,
    pub showing_placeholders: bool,
    pub picked: Option<String>,
    pub cards: Vec<CollectionCard>,
}
