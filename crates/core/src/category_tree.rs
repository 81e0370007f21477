//! Hierarchical shop category tree as rendered in the feed editor.
//!
//! The server renders one row per category. Each row carries a
//! `data-children` attribute holding a JSON array of child ids; the tree is
//! built from those rows and is the structure the propagator walks.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::CategoryId;

/// Which of the two category tables a page shows.
///
/// Product feeds show the mapping table (shop category -> channel
/// category); review and promotion feeds show the plain selection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryTable {
    Mapping,
    Selection,
}

/// Display state attached to a category row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorSlot {
    /// Text shown in the feed-category cell. `None` means the cell is empty.
    pub label: Option<String>,
    /// Whether the dependent channel-category selector row is shown.
    pub selector_visible: bool,
}

impl SelectorSlot {
    pub fn is_empty(&self) -> bool {
        self.label.as_deref().map_or(true, str::is_empty)
    }

    pub fn clear(&mut self) {
        self.label = None;
        self.selector_visible = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    pub children: Vec<CategoryId>,
    pub checked: bool,
    pub slot: SelectorSlot,
}

impl CategoryNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// One server-rendered category row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    /// Raw `data-children` attribute value, e.g. `"[12,13]"`.
    #[serde(default, rename = "data-children")]
    pub children_attr: Option<String>,
}

/// Decode a `data-children` attribute.
///
/// WordPress emits term ids as numbers, older templates as strings; both are
/// accepted. A missing or malformed attribute yields no children.
pub fn parse_children_attr(raw: Option<&str>) -> Vec<CategoryId> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Err(e) => {
            tracing::debug!(raw, error = %e, "Ignoring malformed data-children attribute");
            Vec::new()
        }
    }
}

/// A category table: top-level ids in render order plus every node by id.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    table: CategoryTable,
    roots: Vec<CategoryId>,
    nodes: HashMap<CategoryId, CategoryNode>,
}

impl CategoryTree {
    /// Build a tree from rendered rows.
    ///
    /// Children come from the `data-children` attribute when a row has one,
    /// otherwise from the rows naming it as `parent`. Rows that no other row
    /// lists as a child are top-level, in render order. Duplicate ids and child references to unknown rows
    /// are rejected.
    pub fn from_rendered(
        table: CategoryTable,
        rows: Vec<RenderedCategory>,
    ) -> Result<Self, CoreError> {
        let mut derived: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
        for row in &rows {
            if let Some(parent) = &row.parent {
                derived.entry(parent.clone()).or_default().push(row.id.clone());
            }
        }

        let mut order = Vec::with_capacity(rows.len());
        let mut nodes = HashMap::with_capacity(rows.len());

        for row in rows {
            order.push(row.id.clone());

            let children = if row.children_attr.is_some() {
                parse_children_attr(row.children_attr.as_deref())
            } else {
                derived.remove(&row.id).unwrap_or_default()
            };

            let node = CategoryNode {
                id: row.id.clone(),
                name: row.name,
                children,
                checked: false,
                slot: SelectorSlot::default(),
            };

            if nodes.insert(row.id.clone(), node).is_some() {
                return Err(CoreError::Validation(format!(
                    "Duplicate category id '{}' in rendered table",
                    row.id
                )));
            }
        }

        for node in nodes.values() {
            if let Some(missing) = node.children.iter().find(|c| !nodes.contains_key(*c)) {
                return Err(CoreError::NotFound {
                    entity: "category",
                    id: missing.clone(),
                });
            }
        }

        let listed: HashSet<&str> = nodes
            .values()
            .flat_map(|n| n.children.iter().filter(|c| **c != n.id).map(String::as_str))
            .collect();
        let roots = order
            .iter()
            .filter(|id| !listed.contains(id.as_str()))
            .cloned()
            .collect();

        Ok(Self { table, roots, nodes })
    }

    pub fn table(&self) -> CategoryTable {
        self.table
    }

    /// Top-level category ids in render order.
    pub fn roots(&self) -> &[CategoryId] {
        &self.roots
    }

    pub fn get(&self, id: &str) -> Option<&CategoryNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut CategoryNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| n.checked)
    }

    /// Ids of every checked node, sorted.
    pub fn checked_ids(&self) -> Vec<CategoryId> {
        let mut ids: Vec<CategoryId> = self
            .nodes
            .values()
            .filter(|n| n.checked)
            .map(|n| n.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// `id` followed by all of its descendants, depth-first in render order.
    ///
    /// Each id is yielded once even if the `data-children` lists form a
    /// cycle or repeat a grandchild. Unknown ids yield nothing.
    pub fn subtree(&self, id: &str) -> Vec<CategoryId> {
        let mut order = Vec::new();
        if !self.nodes.contains_key(id) {
            return order;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![id];

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            order.push(node.id.clone());
            for child in node.children.iter().rev() {
                stack.push(child.as_str());
            }
        }

        order
    }

    /// All descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<CategoryId> {
        let mut ids = self.subtree(id);
        if !ids.is_empty() {
            ids.remove(0);
        }
        ids
    }
}

/// The category tables present on an editor page.
///
/// A page is expected to render exactly one of the two tables. Bulk
/// operations act on whichever is present; if a page renders both, the
/// mapping table wins.
#[derive(Debug, Clone, Default)]
pub struct CategoryTables {
    pub mapping: Option<CategoryTree>,
    pub selection: Option<CategoryTree>,
}

impl CategoryTables {
    pub fn active(&self) -> Option<&CategoryTree> {
        self.warn_if_both();
        self.mapping.as_ref().or(self.selection.as_ref())
    }

    pub fn active_mut(&mut self) -> Option<&mut CategoryTree> {
        self.warn_if_both();
        match self.mapping {
            Some(ref mut tree) => Some(tree),
            None => self.selection.as_mut(),
        }
    }

    fn warn_if_both(&self) {
        if self.mapping.is_some() && self.selection.is_some() {
            tracing::warn!("Page holds both category tables, using the mapping table");
        }
    }
}
