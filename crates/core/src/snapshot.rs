//! Decoding of the editor page's initial state.
//!
//! The server renders the feed being edited into `data-wppfm-feed-data`
//! (a JSON-encoded [`FeedPayload`]) and `data-wppfm-feed-url`, together with
//! one category table. [`PageSnapshot::decode`] turns that into a feed
//! configuration and category trees whose checkbox state already matches
//! the feed's active categories.

use serde::{Deserialize, Serialize};

use crate::category_tree::{CategoryTable, CategoryTables, CategoryTree, RenderedCategory};
use crate::error::CoreError;
use crate::feed::{FeedConfiguration, FeedPayload};
use crate::propagator::Propagator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Raw `data-wppfm-feed-data` attribute.
    #[serde(rename = "data-wppfm-feed-data")]
    pub feed_data: String,
    /// Raw `data-wppfm-feed-url` attribute.
    #[serde(default, rename = "data-wppfm-feed-url")]
    pub feed_url: Option<String>,
    #[serde(default)]
    pub category_mapping_table: Option<Vec<RenderedCategory>>,
    #[serde(default)]
    pub category_selection_table: Option<Vec<RenderedCategory>>,
}

/// A decoded page, ready to be owned by an editor session.
#[derive(Debug, Clone)]
pub struct DecodedPage {
    pub feed: FeedConfiguration,
    pub tables: CategoryTables,
}

impl PageSnapshot {
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn decode(self) -> Result<DecodedPage, CoreError> {
        if self.feed_data.trim().is_empty() {
            return Err(CoreError::Validation(
                "Page carries no feed data".to_string(),
            ));
        }
        let payload: FeedPayload = serde_json::from_str(&self.feed_data)?;
        let mut feed = FeedConfiguration::from(payload);

        if let Some(url) = self.feed_url.filter(|u| !u.trim().is_empty()) {
            feed.url = url;
        }

        let mut tables = CategoryTables {
            mapping: self
                .category_mapping_table
                .map(|rows| CategoryTree::from_rendered(CategoryTable::Mapping, rows))
                .transpose()?,
            selection: self
                .category_selection_table
                .map(|rows| CategoryTree::from_rendered(CategoryTable::Selection, rows))
                .transpose()?,
        };

        if let Some(tree) = tables.active_mut() {
            Propagator::new(tree, &mut feed).sync_from_feed();
        }

        tracing::debug!(
            feed_id = ?feed.id,
            active = feed.active_count(),
            "Decoded editor page snapshot"
        );

        Ok(DecodedPage { feed, tables })
    }
}
