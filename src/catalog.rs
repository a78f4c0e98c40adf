//! Catalog model: the full list of showcase entries and the active view.
//!
//! The full catalog is captured once, in source order, and never reordered;
//! an entry's `id` is its position in that order. The active view is an
//! ordered list of ids derived from the full catalog by a filter and an
//! optional shuffle, and is always recomputed from the full catalog.

use crate::error::{Result, ShowcaseError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One entry as supplied by the catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSource {
    /// Display name.
    pub title: String,
    /// Target address. `#` marks an entry that cannot be opened.
    #[serde(default)]
    pub url: String,
    /// Filter tag.
    #[serde(default = "default_category")]
    pub category: String,
    /// Icon reference for the popup.
    #[serde(default)]
    pub icon: Option<String>,
    /// Short description for the popup.
    #[serde(default)]
    pub description: String,
}

fn default_category() -> String {
    "other".to_owned()
}

impl CatalogSource {
    /// Entry with the given title, url and category.
    pub fn new(title: &str, url: &str, category: &str) -> Self {
        Self {
            title: title.to_owned(),
            url: url.to_owned(),
            category: category.to_owned(),
            icon: None,
            description: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    entries: Vec<CatalogSource>,
}

/// Read catalog sources from a TOML file of `[[entries]]` tables.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_sources_from_file(path: &Path) -> Result<Vec<CatalogSource>> {
    let content = std::fs::read_to_string(path)?;
    let file: CatalogFile =
        toml::from_str(&content).map_err(|e| ShowcaseError::Catalog(e.to_string()))?;
    Ok(file.entries)
}

/// A showcase entry with its mutable per-user fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Position in source order. Never reassigned.
    pub id: usize,
    /// Display name, also used for voice matching.
    pub title: String,
    /// Target address.
    pub url: String,
    /// Filter tag.
    pub category: String,
    /// Icon reference.
    pub icon: Option<String>,
    /// Short description.
    pub description: String,
    /// Times this entry became current under the autopilot.
    pub view_count: u32,
    /// User favorite flag.
    pub is_favorite: bool,
}

impl CatalogEntry {
    /// Whether the entry can be previewed or opened.
    pub fn is_launchable(&self) -> bool {
        is_launchable_url(&self.url)
    }
}

/// Whether `url` points somewhere that can actually be opened.
pub fn is_launchable_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty()
        && url != "#"
        && url != "about:blank"
        && !url.to_ascii_lowercase().starts_with("javascript:")
}

/// Which entries make up the active view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterMode {
    /// Every entry.
    #[default]
    All,
    /// Entries marked favorite.
    Favorites,
    /// Entries not in the viewed-set at filter time.
    Unviewed,
    /// Entries whose category equals the tag.
    Category(String),
}

impl FilterMode {
    /// Human label used in notifications.
    pub fn label(&self) -> String {
        match self {
            Self::All => "all apps".to_owned(),
            Self::Favorites => "favorites".to_owned(),
            Self::Unviewed => "not viewed".to_owned(),
            Self::Category(tag) => tag.clone(),
        }
    }

    fn admits(&self, entry: &CatalogEntry, viewed: &[usize]) -> bool {
        match self {
            Self::All => true,
            Self::Favorites => entry.is_favorite,
            Self::Unviewed => !viewed.contains(&entry.id),
            Self::Category(tag) => entry.category == *tag,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Favorites => f.write_str("favorites"),
            Self::Unviewed => f.write_str("unviewed"),
            Self::Category(tag) => f.write_str(tag),
        }
    }
}

impl FromStr for FilterMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "all" => Self::All,
            "favorites" => Self::Favorites,
            "unviewed" => Self::Unviewed,
            tag => Self::Category(tag.to_owned()),
        })
    }
}

impl From<String> for FilterMode {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl From<FilterMode> for String {
    fn from(value: FilterMode) -> Self {
        value.to_string()
    }
}

/// The full catalog plus the active view and traversal position.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    viewed: Vec<usize>,
    filter: FilterMode,
    shuffle: bool,
    view: Vec<usize>,
    current: usize,
    rng: StdRng,
}

impl Catalog {
    /// Capture the full catalog in source order. The active view starts as
    /// the whole catalog, unshuffled.
    pub fn load(sources: Vec<CatalogSource>) -> Self {
        Self::with_rng(sources, StdRng::from_entropy())
    }

    /// Like [`Catalog::load`] with a deterministic shuffle.
    pub fn load_seeded(sources: Vec<CatalogSource>, seed: u64) -> Self {
        Self::with_rng(sources, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sources: Vec<CatalogSource>, rng: StdRng) -> Self {
        let entries: Vec<CatalogEntry> = sources
            .into_iter()
            .enumerate()
            .map(|(id, src)| CatalogEntry {
                id,
                title: src.title,
                url: src.url,
                category: src.category,
                icon: src.icon,
                description: src.description,
                view_count: 0,
                is_favorite: false,
            })
            .collect();
        let view = (0..entries.len()).collect();
        Self {
            entries,
            viewed: Vec::new(),
            filter: FilterMode::All,
            shuffle: false,
            view,
            current: 0,
            rng,
        }
    }

    /// The full catalog in source order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entry by stable id.
    pub fn entry(&self, id: usize) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Ids in the active view, in traversal order.
    pub fn active_ids(&self) -> &[usize] {
        &self.view
    }

    /// Length of the active view.
    pub fn active_len(&self) -> usize {
        self.view.len()
    }

    /// Whether the active view is empty.
    pub fn is_view_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Traversal position; `None` when the active view is empty.
    pub fn current_index(&self) -> Option<usize> {
        (!self.view.is_empty()).then_some(self.current)
    }

    /// Entry at the traversal position.
    pub fn current_entry(&self) -> Option<&CatalogEntry> {
        self.view.get(self.current).and_then(|&id| self.entries.get(id))
    }

    /// Whether the position is on the last entry of the active view.
    pub fn is_at_last(&self) -> bool {
        !self.view.is_empty() && self.current + 1 >= self.view.len()
    }

    /// Active filter.
    pub fn filter(&self) -> &FilterMode {
        &self.filter
    }

    /// Whether shuffle is enabled.
    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }

    /// Recompute the active view from the full catalog with `mode`,
    /// reshuffling if shuffle is on. Resets the position to 0 and returns
    /// the new view length (which may be 0).
    pub fn apply_filter(&mut self, mode: FilterMode) -> usize {
        self.filter = mode;
        self.rebuild_view();
        self.view.len()
    }

    /// Enable or disable shuffle. Disabling restores filtered source order.
    /// Resets the position to 0.
    pub fn set_shuffle(&mut self, enabled: bool) {
        self.shuffle = enabled;
        self.rebuild_view();
    }

    fn rebuild_view(&mut self) {
        let viewed = &self.viewed;
        let filter = &self.filter;
        self.view = self
            .entries
            .iter()
            .filter(|e| filter.admits(e, viewed))
            .map(|e| e.id)
            .collect();
        if self.shuffle {
            self.view.shuffle(&mut self.rng);
        }
        self.current = 0;
    }

    /// Move the position by `delta`, wrapping around the active view.
    /// Returns the new position, or `None` when the view is empty.
    pub fn step(&mut self, delta: isize) -> Option<usize> {
        let len = self.view.len();
        if len == 0 {
            return None;
        }
        let len = len as isize;
        let next = (self.current as isize + delta).rem_euclid(len);
        self.current = next as usize;
        Some(self.current)
    }

    /// Put the position back on the first entry.
    pub fn reset_position(&mut self) {
        self.current = 0;
    }

    /// Flip the favorite flag of entry `id`. Returns the new flag, or
    /// `None` for an unknown id.
    pub fn toggle_favorite(&mut self, id: usize) -> Option<bool> {
        let entry = self.entries.get_mut(id)?;
        entry.is_favorite = !entry.is_favorite;
        Some(entry.is_favorite)
    }

    /// Count a view of entry `id` and add it to the viewed-set.
    /// Returns the new view count, or `None` for an unknown id.
    pub fn record_view(&mut self, id: usize) -> Option<u32> {
        let entry = self.entries.get_mut(id)?;
        entry.view_count = entry.view_count.saturating_add(1);
        if !self.viewed.contains(&id) {
            self.viewed.push(id);
        }
        Some(entry.view_count)
    }

    /// Ids shown at least once, in first-view order.
    pub fn viewed_ids(&self) -> &[usize] {
        &self.viewed
    }

    /// Forget every view. View counts are kept.
    pub fn clear_viewed(&mut self) {
        self.viewed.clear();
    }

    /// Ids of favorite entries in source order.
    pub fn favorite_ids(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|e| e.is_favorite)
            .map(|e| e.id)
            .collect()
    }

    /// Favorite entries in source order.
    pub fn favorites(&self) -> Vec<&CatalogEntry> {
        self.entries.iter().filter(|e| e.is_favorite).collect()
    }

    /// Mark exactly `ids` as favorites. Unknown ids are ignored.
    pub fn restore_favorites(&mut self, ids: &[usize]) {
        for entry in &mut self.entries {
            entry.is_favorite = ids.contains(&entry.id);
        }
    }

    /// Replace the viewed-set. Unknown and duplicate ids are dropped.
    pub fn restore_viewed(&mut self, ids: &[usize]) {
        self.viewed.clear();
        for &id in ids {
            if id < self.entries.len() && !self.viewed.contains(&id) {
                self.viewed.push(id);
            }
        }
    }

    /// First entry, in source order, whose lowercased title contains
    /// `query` or is contained in it.
    pub fn find_by_title(&self, query: &str) -> Option<&CatalogEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.entries.iter().find(|e| {
            let title = e.title.to_lowercase();
            !title.is_empty() && (title.contains(&query) || query.contains(&title))
        })
    }
}
