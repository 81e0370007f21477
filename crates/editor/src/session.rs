//! Editor page session.
//!
//! [`EditorSession`] is the single owner of the feed being edited and of the
//! page's category table. Every category operation goes through it, and it
//! hands out explicit [`Propagator`] views instead of sharing state.
//!
//! Saves are split into [`EditorSession::begin_save`] and
//! [`EditorSession::complete_save`] so that several saves may be in flight.
//! Each change to the feed bumps a revision; a response for an older revision
//! than the current one is recorded as stale and does not touch the feed.

use wppfm_core::category_tree::{CategoryTables, CategoryTree};
use wppfm_core::error::CoreError;
use wppfm_core::feed::{FeedConfiguration, FeedDetails, FeedPayload, FeedStatus};
use wppfm_core::level_selector::LevelSelector;
use wppfm_core::propagator::{self, Propagator};
use wppfm_core::snapshot::{DecodedPage, PageSnapshot};
use wppfm_core::types::ChannelId;

use crate::backend::{BackendError, FeedBackend, OutputAttribute, SaveResponse};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Feed has not been saved yet")]
    Unsaved,
}

/// A save that has been sent but not answered.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub revision: u64,
    pub payload: FeedPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The response matched the current revision; the session is clean.
    Applied,
    /// The feed changed after this save was sent. The new feed id (if any)
    /// is kept, everything else in memory wins.
    Stale,
}

pub struct EditorSession {
    feed: FeedConfiguration,
    tables: CategoryTables,
    level_selector: LevelSelector,
    revision: u64,
    saved_revision: Option<u64>,
}

impl EditorSession {
    pub fn new(page: DecodedPage) -> Self {
        let saved_revision = page.feed.id.map(|_| 0);
        Self {
            feed: page.feed,
            tables: page.tables,
            level_selector: LevelSelector::new(),
            revision: 0,
            saved_revision,
        }
    }

    pub fn from_snapshot(snapshot: PageSnapshot) -> Result<Self, CoreError> {
        Ok(Self::new(snapshot.decode()?))
    }

    pub fn feed(&self) -> &FeedConfiguration {
        &self.feed
    }

    /// Edit plain feed fields (title, file name, schedule, attribute blocks).
    /// Category state and the channel have their own operations.
    pub fn edit_feed(&mut self, edit: impl FnOnce(&mut FeedDetails)) {
        let mut details = self.feed.details();
        edit(&mut details);
        if self.feed.apply_details(details) {
            self.touch();
        }
    }

    pub fn category_table(&self) -> Option<&CategoryTree> {
        self.tables.active()
    }

    pub fn level_selector(&self) -> &LevelSelector {
        &self.level_selector
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether there are changes not confirmed by a save response.
    pub fn is_dirty(&self) -> bool {
        self.saved_revision != Some(self.revision)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn touch_if_changed(&mut self, before: &FeedConfiguration) {
        if self.feed != *before {
            self.touch();
        }
    }

    /// Run `op` against the page's category table. Pages without a table
    /// make every category operation a no-op. The revision only moves when
    /// the feed changed; checkbox state mirrors the feed's active set.
    fn with_propagator<R>(&mut self, op: impl FnOnce(&mut Propagator<'_>) -> R) -> Option<R> {
        let Some(tree) = self.tables.active_mut() else {
            tracing::debug!("No category table on page, ignoring category operation");
            return None;
        };
        let before = self.feed.clone();
        let result = op(&mut Propagator::new(tree, &mut self.feed));
        self.touch_if_changed(&before);
        Some(result)
    }

    // -- categories ---------------------------------------------------------

    pub fn activate_category(&mut self, id: &str) {
        self.with_propagator(|p| p.activate(id));
    }

    pub fn deactivate_category(&mut self, id: &str) {
        self.with_propagator(|p| p.deactivate(id));
    }

    pub fn deactivate_category_cascade(&mut self, id: &str) {
        self.with_propagator(|p| p.deactivate_cascade(id));
    }

    pub fn toggle_category(&mut self, id: &str, checked: bool) {
        self.with_propagator(|p| p.toggle(id, checked));
    }

    pub fn activate_all(&mut self) {
        self.with_propagator(|p| p.activate_all());
    }

    pub fn deactivate_all(&mut self) {
        self.with_propagator(|p| p.deactivate_all());
    }

    /// Open the channel-category picker for an active shop category.
    pub fn open_category_selector(&mut self, id: &str) {
        if self.with_propagator(|p| p.open_selector(id)) == Some(true) {
            self.level_selector.reset();
        }
    }

    // -- taxonomy picker ----------------------------------------------------

    pub fn select_level(&mut self, depth: usize, value: impl Into<String>) {
        self.level_selector.select(depth, value);
    }

    pub fn hide_sublevels(&mut self, level_id: &str) {
        self.level_selector.hide_sublevels(level_id);
    }

    /// Assign the picker's current path to `id` and reset the picker.
    /// Does nothing while no level is selected.
    pub fn apply_selected_category(&mut self, id: &str) {
        let Some(path) = self.level_selector.category_path() else {
            return;
        };
        self.with_propagator(|p| p.assign_feed_category(id, &path));
        self.level_selector.reset();
    }

    // -- channel ------------------------------------------------------------

    /// Switch channel and relabel the active rows for the new mapping mode.
    pub fn set_channel(&mut self, channel: ChannelId) {
        if propagator::switch_channel(&mut self.feed, self.tables.active_mut(), channel) {
            self.touch();
        }
    }

    // -- persistence --------------------------------------------------------

    /// Validate the feed and capture the payload to send.
    pub fn begin_save(&self) -> Result<PendingSave, CoreError> {
        self.feed.validate()?;
        Ok(PendingSave {
            revision: self.revision,
            payload: self.feed.to_payload(),
        })
    }

    /// Apply a save response for `pending`.
    pub fn complete_save(&mut self, pending: &PendingSave, response: SaveResponse) -> SaveOutcome {
        if self.feed.id.is_none() {
            self.feed.id = Some(response.feed_id);
        }

        if pending.revision == self.revision {
            self.saved_revision = Some(self.revision);
            tracing::info!(feed_id = response.feed_id, revision = self.revision, "Feed save applied");
            SaveOutcome::Applied
        } else {
            tracing::warn!(
                feed_id = response.feed_id,
                sent_revision = pending.revision,
                current_revision = self.revision,
                "Ignoring stale save response"
            );
            SaveOutcome::Stale
        }
    }

    /// Validate, save and apply the response.
    pub async fn save(&mut self, backend: &dyn FeedBackend) -> Result<SaveOutcome, SessionError> {
        let pending = self.begin_save()?;
        let response = backend.save_feed(&pending.payload).await?;
        Ok(self.complete_save(&pending, response))
    }

    /// Ask the server to regenerate the feed file.
    pub async fn generate(&mut self, backend: &dyn FeedBackend) -> Result<FeedStatus, SessionError> {
        let feed_id = self.feed.id.ok_or(SessionError::Unsaved)?;
        let status = backend.generate_feed(feed_id).await?;
        self.feed.status = status;
        Ok(status)
    }

    pub async fn output_attributes(
        &self,
        backend: &dyn FeedBackend,
    ) -> Result<Vec<OutputAttribute>, SessionError> {
        let feed_id = self.feed.id.ok_or(SessionError::Unsaved)?;
        Ok(backend.fetch_attributes(feed_id, self.feed.channel()).await?)
    }
}
