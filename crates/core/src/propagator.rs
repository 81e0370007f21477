//! Category activation propagation.
//!
//! [`Propagator`] keeps the checkbox state of a [`CategoryTree`] and the
//! active-category set of a [`FeedConfiguration`] in step. Activation
//! cascades through every descendant. Deactivation comes in two variants:
//! [`Propagator::deactivate`] touches only the given node, while
//! [`Propagator::deactivate_cascade`] is used from parent and bulk contexts
//! and clears the whole subtree.
//!
//! Unknown category ids are silently ignored.

use crate::category_tree::{CategoryNode, CategoryTable, CategoryTree};
use crate::feed::{FeedConfiguration, MappingMode};
use crate::types::ChannelId;

/// Label shown for a category mapped to the channel's default category.
pub const DEFAULT_CATEGORY_LABEL: &str = "map to default category";

/// Label to put in an empty feed-category cell for `node`.
pub fn mapping_label(node: &CategoryNode, mode: MappingMode) -> String {
    match mode {
        MappingMode::OwnShopCategory => node.name.clone(),
        MappingMode::Default => DEFAULT_CATEGORY_LABEL.to_string(),
    }
}

/// Borrowed view over one category table and the feed being edited.
pub struct Propagator<'a> {
    tree: &'a mut CategoryTree,
    feed: &'a mut FeedConfiguration,
}

impl<'a> Propagator<'a> {
    pub fn new(tree: &'a mut CategoryTree, feed: &'a mut FeedConfiguration) -> Self {
        Self { tree, feed }
    }

    /// Check `id` and all of its descendants and record them as active.
    ///
    /// In the mapping table, empty feed-category cells get a label matching
    /// the channel's mapping mode; cells that already show something are
    /// left alone. Calling this again on an active subtree changes nothing.
    pub fn activate(&mut self, id: &str) {
        let ids = self.tree.subtree(id);
        if ids.is_empty() {
            tracing::debug!(category_id = id, "Ignoring activation of unknown category");
            return;
        }

        let uses_shop_categories = self.feed.uses_shop_categories();
        let mode = MappingMode::for_channel(uses_shop_categories);
        let fill_labels = self.tree.table() == CategoryTable::Mapping;

        for category_id in &ids {
            self.feed.activate_category(category_id, uses_shop_categories);

            let Some(node) = self.tree.get_mut(category_id) else {
                continue;
            };
            node.checked = true;
            if fill_labels && node.slot.is_empty() {
                let label = mapping_label(node, mode);
                node.slot.label = Some(label);
            }
        }

        tracing::debug!(category_id = id, affected = ids.len(), "Activated category");
    }

    /// Uncheck `id` alone: clear its cell, hide its selector row and drop it
    /// from the active set. Descendants and siblings are untouched.
    pub fn deactivate(&mut self, id: &str) {
        if !self.deactivate_node(id) {
            tracing::debug!(category_id = id, "Ignoring deactivation of unknown category");
        }
    }

    /// Deactivate `id` and every descendant.
    pub fn deactivate_cascade(&mut self, id: &str) {
        let ids = self.tree.subtree(id);
        if ids.is_empty() {
            tracing::debug!(category_id = id, "Ignoring deactivation of unknown category");
            return;
        }
        for category_id in &ids {
            self.deactivate_node(category_id);
        }
        tracing::debug!(category_id = id, affected = ids.len(), "Deactivated category subtree");
    }

    /// Apply a checkbox change.
    ///
    /// Unchecking a parent clears its subtree; unchecking a leaf only
    /// affects the leaf.
    pub fn toggle(&mut self, id: &str, checked: bool) {
        if checked {
            self.activate(id);
            return;
        }
        match self.tree.get(id) {
            Some(node) if node.has_children() => self.deactivate_cascade(id),
            Some(_) => self.deactivate(id),
            None => {
                tracing::debug!(category_id = id, "Ignoring toggle of unknown category");
            }
        }
    }

    /// Activate every top-level category (and so the whole table).
    pub fn activate_all(&mut self) {
        for root in self.tree.roots().to_vec() {
            self.activate(&root);
        }
    }

    /// Deactivate every top-level category and its subtree.
    pub fn deactivate_all(&mut self) {
        for root in self.tree.roots().to_vec() {
            self.deactivate_cascade(&root);
        }
    }

    /// Show the channel-category selector row of an active category.
    /// Returns whether the row is shown.
    pub fn open_selector(&mut self, id: &str) -> bool {
        if !self.feed.is_active(id) {
            return false;
        }
        match self.tree.get_mut(id) {
            Some(node) => {
                node.slot.selector_visible = true;
                true
            }
            None => false,
        }
    }

    /// Store a chosen channel taxonomy path for an active category, show it
    /// in the category's cell and close its selector row.
    pub fn assign_feed_category(&mut self, id: &str, path: &str) {
        if !self.feed.set_feed_category(id, path) {
            tracing::debug!(category_id = id, "Ignoring feed category for inactive category");
            return;
        }
        if let Some(node) = self.tree.get_mut(id) {
            node.slot.label = Some(path.to_string());
            node.slot.selector_visible = false;
        }
    }

    /// Bring checkbox state in line with the feed's active set, e.g. right
    /// after seeding both from a page snapshot.
    ///
    /// Active ids that are not in the table are dropped from the feed so
    /// that the active set never names a category the page cannot show.
    pub fn sync_from_feed(&mut self) {
        let tree = &*self.tree;
        let mut dropped = Vec::new();
        self.feed.retain_active(|id| {
            let known = tree.contains(id);
            if !known {
                dropped.push(id.to_string());
            }
            known
        });
        if !dropped.is_empty() {
            tracing::warn!(?dropped, "Dropping active categories missing from the category table");
        }

        let fill_labels = self.tree.table() == CategoryTable::Mapping;
        let mut ids: Vec<String> = self.tree.checked_ids();
        ids.extend(self.feed.active_categories().map(|(id, _)| id.clone()));

        for id in ids {
            let mapping = self.feed.mapping(&id).cloned();
            let Some(node) = self.tree.get_mut(&id) else {
                continue;
            };
            match mapping {
                Some(mapping) => {
                    node.checked = true;
                    if fill_labels {
                        let label = mapping
                            .feed_category
                            .unwrap_or_else(|| mapping_label(node, mapping.mode));
                        node.slot.label = Some(label);
                    }
                }
                None => {
                    node.checked = false;
                    node.slot.clear();
                }
            }
        }
    }

    fn deactivate_node(&mut self, id: &str) -> bool {
        let Some(node) = self.tree.get_mut(id) else {
            return false;
        };
        node.checked = false;
        node.slot.clear();
        self.feed.deactivate_category(id);
        true
    }
}

/// Switch `feed` to `channel` and relabel `tree` for the new mapping mode.
/// Pages without a category table only update the feed. Returns whether the
/// channel changed.
pub fn switch_channel(
    feed: &mut FeedConfiguration,
    tree: Option<&mut CategoryTree>,
    channel: ChannelId,
) -> bool {
    if !feed.set_channel(channel) {
        return false;
    }
    if let Some(tree) = tree {
        Propagator::new(tree, feed).sync_from_feed();
    }
    true
}
