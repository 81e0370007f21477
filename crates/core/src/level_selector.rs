//! Cascading channel-taxonomy picker.
//!
//! A channel category is chosen one level at a time: picking a value at
//! level `n` reveals level `n + 1`. Changing an intermediate level makes
//! every deeper choice stale, so those levels are hidden and cleared.

/// Deepest selectable taxonomy level.
pub const MAX_LEVEL: usize = 7;

/// Separator used in channel taxonomy paths.
pub const PATH_SEPARATOR: &str = " > ";

const LEVEL_PREFIX: &str = "lvl_";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Level {
    pub visible: bool,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSelector {
    levels: [Level; MAX_LEVEL + 1],
}

impl Default for LevelSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the depth from a level id such as `"lvl_3"`.
pub fn parse_level_id(level_id: &str) -> Option<usize> {
    level_id
        .strip_prefix(LEVEL_PREFIX)
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n <= MAX_LEVEL)
}

/// Build the level id for a depth.
pub fn level_id(depth: usize) -> String {
    format!("{LEVEL_PREFIX}{depth}")
}

impl LevelSelector {
    /// A picker with only the top level shown.
    pub fn new() -> Self {
        let mut levels: [Level; MAX_LEVEL + 1] = Default::default();
        levels[0].visible = true;
        Self { levels }
    }

    pub fn level(&self, depth: usize) -> Option<&Level> {
        self.levels.get(depth)
    }

    /// Hide and clear every level deeper than the one named by `level_id`.
    ///
    /// A malformed or out-of-range id is ignored.
    pub fn hide_sublevels(&mut self, level_id: &str) {
        let Some(depth) = parse_level_id(level_id) else {
            tracing::debug!(level_id, "Ignoring unknown taxonomy level id");
            return;
        };
        for level in &mut self.levels[depth + 1..] {
            level.visible = false;
            level.selected = None;
        }
    }

    /// Record `value` at `depth`, discard deeper choices and reveal the
    /// next level. Out-of-range depths are ignored.
    pub fn select(&mut self, depth: usize, value: impl Into<String>) {
        if depth > MAX_LEVEL {
            tracing::debug!(depth, "Ignoring selection beyond deepest taxonomy level");
            return;
        }
        self.hide_sublevels(&level_id(depth));

        let level = &mut self.levels[depth];
        level.visible = true;
        level.selected = Some(value.into());

        if let Some(next) = self.levels.get_mut(depth + 1) {
            next.visible = true;
        }
    }

    /// Selected values from the top down to the first unselected level.
    pub fn selected_path(&self) -> Vec<&str> {
        self.levels
            .iter()
            .map_while(|l| l.selected.as_deref())
            .collect()
    }

    /// Selected values joined as a channel taxonomy path, e.g.
    /// `"Apparel & Accessories > Clothing"`. `None` if nothing is selected.
    pub fn category_path(&self) -> Option<String> {
        let path = self.selected_path();
        if path.is_empty() {
            None
        } else {
            Some(path.join(PATH_SEPARATOR))
        }
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> LevelSelector {
        let mut picker = LevelSelector::new();
        for depth in 0..=MAX_LEVEL {
            picker.select(depth, format!("L{depth}"));
        }
        picker
    }

    #[test]
    fn parses_level_ids() {
        assert_eq!(parse_level_id("lvl_0"), Some(0));
        assert_eq!(parse_level_id("lvl_7"), Some(7));
        assert_eq!(parse_level_id("lvl_8"), None);
        assert_eq!(parse_level_id("level_3"), None);
        assert_eq!(parse_level_id("lvl_x"), None);
        assert_eq!(level_id(4), "lvl_4");
    }

    #[test]
    fn new_picker_shows_top_level_only() {
        let picker = LevelSelector::new();
        assert!(picker.level(0).unwrap().visible);
        assert!((1..=MAX_LEVEL).all(|d| !picker.level(d).unwrap().visible));
    }

    #[test]
    fn hide_sublevels_clears_deeper_levels_only() {
        let mut picker = filled();
        picker.hide_sublevels("lvl_3");

        for depth in 0..=3 {
            let level = picker.level(depth).unwrap();
            assert!(level.visible);
            assert_eq!(level.selected.as_deref(), Some(format!("L{depth}").as_str()));
        }
        for depth in 4..=MAX_LEVEL {
            let level = picker.level(depth).unwrap();
            assert!(!level.visible);
            assert!(level.selected.is_none());
        }
    }

    #[test]
    fn hide_sublevels_ignores_bad_ids() {
        let mut picker = filled();
        let before = picker.clone();
        picker.hide_sublevels("lvl_");
        picker.hide_sublevels("category_2");
        assert_eq!(picker, before);
    }

    #[test]
    fn reselecting_intermediate_level_discards_stale_path() {
        let mut picker = LevelSelector::new();
        picker.select(0, "Apparel & Accessories");
        picker.select(1, "Clothing");
        picker.select(2, "Shirts & Tops");
        picker.select(1, "Shoes");

        assert_eq!(picker.category_path().as_deref(), Some("Apparel & Accessories > Shoes"));
        assert!(picker.level(2).unwrap().visible);
        assert!(picker.level(2).unwrap().selected.is_none());
        assert!(!picker.level(3).unwrap().visible);
    }

    #[test]
    fn empty_picker_has_no_path() {
        let mut picker = filled();
        picker.reset();
        assert_eq!(picker.category_path(), None);
        assert_eq!(picker, LevelSelector::new());
    }
}
