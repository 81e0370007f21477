//! Integration tests for the editor session: seeding from a page snapshot,
//! category propagation through the session, and the save flow against a
//! mock backend.

use std::sync::Mutex;

use assert_matches::assert_matches;
use async_trait::async_trait;
use serde_json::json;

use wppfm_core::channels;
use wppfm_core::error::CoreError;
use wppfm_core::feed::{FeedPayload, FeedStatus, MappingMode};
use wppfm_core::propagator::DEFAULT_CATEGORY_LABEL;
use wppfm_core::snapshot::PageSnapshot;
use wppfm_core::types::{ChannelId, FeedId};
use wppfm_editor::backend::{BackendError, FeedBackend, OutputAttribute, SaveResponse};
use wppfm_editor::session::{EditorSession, SaveOutcome, SessionError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Records every saved payload and answers with a fixed feed id.
struct MockBackend {
    feed_id: FeedId,
    saved: Mutex<Vec<FeedPayload>>,
    fail_with: Option<u16>,
}

impl MockBackend {
    fn new(feed_id: FeedId) -> Self {
        Self { feed_id, saved: Mutex::new(Vec::new()), fail_with: None }
    }

    fn failing(status: u16) -> Self {
        Self { fail_with: Some(status), ..Self::new(0) }
    }

    fn saved(&self) -> Vec<FeedPayload> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedBackend for MockBackend {
    async fn save_feed(&self, payload: &FeedPayload) -> Result<SaveResponse, BackendError> {
        if let Some(status) = self.fail_with {
            return Err(BackendError::HttpStatus(status));
        }
        self.saved.lock().unwrap().push(payload.clone());
        Ok(SaveResponse { feed_id: self.feed_id })
    }

    async fn generate_feed(&self, _feed_id: FeedId) -> Result<FeedStatus, BackendError> {
        Ok(FeedStatus::Processing)
    }

    async fn fetch_attributes(
        &self,
        _feed_id: FeedId,
        _channel: ChannelId,
    ) -> Result<Vec<OutputAttribute>, BackendError> {
        Ok(vec![OutputAttribute {
            field_name: "google_product_category".to_string(),
            label: None,
            category: "required".to_string(),
        }])
    }
}

/// ```text
/// 10 Clothing
///   11 Shirts
///   12 Trousers
/// 20 Shoes
/// ```
fn product_page(feed_data: serde_json::Value) -> PageSnapshot {
    let raw = json!({
        "data-wppfm-feed-data": feed_data.to_string(),
        "category_mapping_table": [
            { "id": "10", "name": "Clothing", "data-children": "[11, 12]" },
            { "id": "11", "name": "Shirts", "parent": "10", "data-children": "[]" },
            { "id": "12", "name": "Trousers", "parent": "10", "data-children": "[]" },
            { "id": "20", "name": "Shoes", "data-children": "[]" }
        ]
    });
    PageSnapshot::from_json(&raw.to_string()).unwrap()
}

fn new_google_feed() -> EditorSession {
    let page = product_page(json!({
        "title": "Google shopping",
        "file_name": "google-shopping",
        "feed_type": 1,
        "channel": channels::GOOGLE,
    }));
    EditorSession::from_snapshot(page).unwrap()
}

// ---------------------------------------------------------------------------
// Category operations
// ---------------------------------------------------------------------------

#[test]
fn activating_parent_activates_children_through_session() {
    let mut session = new_google_feed();
    session.activate_category("10");

    let tree = session.category_table().unwrap();
    for id in ["10", "11", "12"] {
        assert!(tree.is_checked(id));
        assert!(session.feed().is_active(id));
        assert_eq!(tree.get(id).unwrap().slot.label.as_deref(), Some(DEFAULT_CATEGORY_LABEL));
    }
    assert!(!session.feed().is_active("20"));
}

#[test]
fn unchecking_leaf_keeps_sibling() {
    let mut session = new_google_feed();
    session.toggle_category("10", true);
    session.toggle_category("11", false);

    assert!(!session.feed().is_active("11"));
    assert!(session.feed().is_active("12"));
    assert!(session.feed().is_active("10"));
}

#[test]
fn bulk_select_and_clear() {
    let mut session = new_google_feed();
    session.activate_all();
    assert_eq!(session.feed().active_count(), 4);

    session.deactivate_all();
    assert_eq!(session.feed().active_count(), 0);
    assert!(session.category_table().unwrap().checked_ids().is_empty());
}

#[test]
fn picker_path_is_assigned_to_category() {
    let mut session = new_google_feed();
    session.activate_category("20");
    session.open_category_selector("20");
    session.select_level(0, "Apparel & Accessories");
    session.select_level(1, "Shoes");
    session.select_level(2, "Sneakers");
    session.hide_sublevels("lvl_1");
    session.apply_selected_category("20");

    let mapping = session.feed().mapping("20").unwrap();
    assert_eq!(mapping.feed_category.as_deref(), Some("Apparel & Accessories > Shoes"));
    assert_eq!(session.level_selector().category_path(), None);
}

#[test]
fn switching_channel_relabels_rows() {
    let mut session = new_google_feed();
    session.activate_category("20");
    session.set_channel(channels::CUSTOM);

    assert_eq!(session.feed().mapping("20").unwrap().mode, MappingMode::OwnShopCategory);
    assert_eq!(
        session.category_table().unwrap().get("20").unwrap().slot.label.as_deref(),
        Some("Shoes")
    );
}

#[test]
fn opening_inactive_selector_keeps_picker() {
    let mut session = new_google_feed();
    session.select_level(0, "Apparel & Accessories");

    session.open_category_selector("20");
    assert_eq!(session.level_selector().category_path().as_deref(), Some("Apparel & Accessories"));

    session.activate_category("20");
    session.open_category_selector("20");
    assert_eq!(session.level_selector().category_path(), None);
    assert!(session.category_table().unwrap().get("20").unwrap().slot.selector_visible);
}

#[test]
fn unchanged_channel_keeps_revision() {
    let mut session = new_google_feed();
    session.activate_category("20");
    let revision = session.revision();

    session.set_channel(channels::GOOGLE);
    assert_eq!(session.revision(), revision);

    session.set_channel(channels::CUSTOM);
    assert_eq!(session.revision(), revision + 1);
}

#[test]
fn page_without_table_ignores_category_operations() {
    let raw = json!({
        "data-wppfm-feed-data": json!({"title": "Reviews", "feed_type": 2, "channel": 1}).to_string()
    });
    let mut session =
        EditorSession::from_snapshot(PageSnapshot::from_json(&raw.to_string()).unwrap()).unwrap();
    let revision = session.revision();

    session.activate_all();
    session.activate_category("10");

    assert!(session.category_table().is_none());
    assert_eq!(session.feed().active_count(), 0);
    assert_eq!(session.revision(), revision);
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_assigns_feed_id_and_cleans_session() {
    let backend = MockBackend::new(42);
    let mut session = new_google_feed();
    session.activate_category("20");
    assert!(session.is_dirty());

    let outcome = session.save(&backend).await.unwrap();

    assert_eq!(outcome, SaveOutcome::Applied);
    assert_eq!(session.feed().id, Some(42));
    assert!(!session.is_dirty());

    let saved = backend.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].category_mapping.len(), 1);
    assert_eq!(saved[0].category_mapping[0].shop_category_id, "20");
}

#[tokio::test]
async fn invalid_feed_is_not_sent() {
    let backend = MockBackend::new(1);
    let mut session = new_google_feed();

    let err = session.save(&backend).await.unwrap_err();

    assert_matches!(err, SessionError::Core(CoreError::Validation(_)));
    assert!(backend.saved().is_empty());
}

#[tokio::test]
async fn backend_failure_surfaces() {
    let backend = MockBackend::failing(500);
    let mut session = new_google_feed();
    session.activate_category("10");

    let err = session.save(&backend).await.unwrap_err();
    assert_matches!(err, SessionError::Backend(BackendError::HttpStatus(500)));
    assert!(session.is_dirty());
}

#[test]
fn out_of_order_response_is_stale() {
    let mut session = new_google_feed();
    session.activate_category("10");
    let first = session.begin_save().unwrap();

    session.deactivate_category("12");
    let second = session.begin_save().unwrap();

    assert_eq!(
        session.complete_save(&second, SaveResponse { feed_id: 5 }),
        SaveOutcome::Applied
    );
    assert_eq!(
        session.complete_save(&first, SaveResponse { feed_id: 5 }),
        SaveOutcome::Stale
    );
    assert!(!session.is_dirty());
    assert!(!session.feed().is_active("12"));
}

#[test]
fn view_only_operations_keep_pending_save_current() {
    let mut session = new_google_feed();
    session.activate_category("20");
    let pending = session.begin_save().unwrap();

    session.open_category_selector("20");
    session.deactivate_category("does-not-exist");
    session.activate_category("20");
    session.select_level(0, "Apparel & Accessories");

    assert_eq!(
        session.complete_save(&pending, SaveResponse { feed_id: 9 }),
        SaveOutcome::Applied
    );
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn generate_requires_saved_feed() {
    let backend = MockBackend::new(8);
    let mut session = new_google_feed();

    assert_matches!(session.generate(&backend).await, Err(SessionError::Unsaved));

    session.activate_category("10");
    session.save(&backend).await.unwrap();
    assert_eq!(session.generate(&backend).await.unwrap(), FeedStatus::Processing);
    assert_eq!(session.feed().status, FeedStatus::Processing);

    let attributes = session.output_attributes(&backend).await.unwrap();
    assert_eq!(attributes[0].field_name, "google_product_category");
}

#[tokio::test]
async fn edits_after_save_mark_session_dirty() {
    let backend = MockBackend::new(3);
    let mut session = new_google_feed();
    session.activate_category("10");
    session.save(&backend).await.unwrap();

    session.edit_feed(|feed| feed.title = "Google shopping NL".to_string());
    assert!(session.is_dirty());
}

#[tokio::test]
async fn unchanged_edit_keeps_session_clean() {
    let backend = MockBackend::new(3);
    let mut session = new_google_feed();
    session.activate_category("10");
    session.save(&backend).await.unwrap();

    session.edit_feed(|feed| feed.title = "Google shopping".to_string());
    assert!(!session.is_dirty());
}

#[test]
fn field_edits_leave_category_state_in_step() {
    let mut session = new_google_feed();
    session.activate_category("10");
    session.edit_feed(|feed| {
        feed.title = "Google shopping NL".to_string();
        feed.file_name = "google-shopping-nl".to_string();
    });

    let active: Vec<String> = session.feed().active_categories().map(|(id, _)| id.clone()).collect();
    assert_eq!(session.category_table().unwrap().checked_ids(), active);
    assert_eq!(session.feed().title, "Google shopping NL");
}
