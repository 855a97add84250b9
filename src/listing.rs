//! List view engine: per-page search/sort state, global view mode, and the
//! pure filter/sort over a partner collection.
//!
//! State changes go through [`ListState::reduce`], which returns the next
//! state, whether the view must be rebuilt, and the preference writes the
//! caller should apply. Nothing here touches storage directly.
use std::cmp::Ordering;

use crate::content::{Collections, PartnerItem};
use crate::preferences::{PreferenceStore, KEY_VIEW_MODE};
use crate::util::MAX_SEARCH_TERM_LENGTH;

/// Placeholder rendered when filtering leaves nothing to show.
pub const EMPTY_LISTING_MESSAGE: &str = "No partners found.";

// ============================================================================
// Page / Sort / View
// ============================================================================

/// Which collection a listing (or detail view) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    LiveTv,
    Ott,
}

impl PageType {
    /// Route name and preference-key prefix.
    pub fn key(self) -> &'static str {
        match self {
            PageType::LiveTv => "live-tv",
            PageType::Ott => "ott",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PageType::LiveTv => "Live TV Channels",
            PageType::Ott => "OTT Platforms",
        }
    }

    /// Fragment of the listing page, used by "Back to list".
    pub fn fragment(self) -> String {
        format!("#{}", self.key())
    }

    /// `live-tv` selects the TV collection; every other page name the OTT one.
    pub fn for_page(page: &str) -> Self {
        if page == "live-tv" {
            PageType::LiveTv
        } else {
            PageType::Ott
        }
    }

    pub fn items(self, collections: &Collections) -> &[PartnerItem] {
        match self {
            PageType::LiveTv => &collections.tv,
            PageType::Ott => &collections.ott,
        }
    }

    fn search_key(self) -> String {
        format!("{}_search", self.key())
    }

    fn sort_key(self) -> String {
        format!("{}_sort", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMethod {
    #[default]
    Az,
    Za,
}

impl SortMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMethod::Az => "az",
            SortMethod::Za => "za",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMethod::Az => "A-Z",
            SortMethod::Za => "Z-A",
        }
    }

    /// Unknown stored values fall back to A-Z.
    pub fn parse(s: &str) -> Self {
        match s {
            "za" => SortMethod::Za,
            _ => SortMethod::Az,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Grid => "grid",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "grid" => ViewMode::Grid,
            _ => ViewMode::List,
        }
    }
}

// ============================================================================
// Filter & Sort
// ============================================================================

/// Case-folded comparison with the raw string as tiebreaker, so
/// `"apple" < "Banana" < "banana"` and the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Items whose name contains `search_term` (case-insensitive), sorted by
/// name. Never mutates or caches; call it on every change.
pub fn apply_filters_and_sort<'a>(
    items: &'a [PartnerItem],
    search_term: &str,
    sort: SortMethod,
) -> Vec<&'a PartnerItem> {
    let needle = search_term.to_lowercase();
    let mut visible: Vec<&PartnerItem> = items
        .iter()
        .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
        .collect();

    visible.sort_by(|a, b| {
        let ord = compare_names(&a.name, &b.name);
        match sort {
            SortMethod::Az => ord,
            SortMethod::Za => ord.reverse(),
        }
    });
    visible
}

// ============================================================================
// ListState reducer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    SetViewMode(ViewMode),
    SetSearch(String),
    SetSort(SortMethod),
}

/// What the caller should do with the view after a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRender {
    /// Nothing visible changed
    Unchanged,
    /// Rebuild the listing from [`ListState::visible`]
    Rebuild,
}

/// A preference write produced by a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefWrite {
    pub key: String,
    pub value: String,
}

impl PrefWrite {
    fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Apply the writes returned by [`ListState::reduce`].
pub fn apply_writes(store: &mut dyn PreferenceStore, writes: &[PrefWrite]) {
    for write in writes {
        store.set(&write.key, &write.value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub page: PageType,
    pub view_mode: ViewMode,
    pub search_term: String,
    pub sort: SortMethod,
    /// Index into the visible (filtered, sorted) items
    pub selected: usize,
}

impl ListState {
    /// State for entering `page`: persisted values win over defaults.
    pub fn enter(page: PageType, prefs: &dyn PreferenceStore) -> Self {
        Self {
            page,
            view_mode: prefs
                .get(KEY_VIEW_MODE)
                .map(|v| ViewMode::parse(&v))
                .unwrap_or_default(),
            search_term: prefs.get(&page.search_key()).unwrap_or_default(),
            sort: prefs
                .get(&page.sort_key())
                .map(|v| SortMethod::parse(&v))
                .unwrap_or_default(),
            selected: 0,
        }
    }

    pub fn reduce(self, action: ListAction) -> (ListState, ListRender, Vec<PrefWrite>) {
        match action {
            ListAction::SetViewMode(mode) => {
                if mode == self.view_mode {
                    return (self, ListRender::Unchanged, Vec::new());
                }
                let write = PrefWrite::new(KEY_VIEW_MODE, mode.as_str());
                let next = ListState {
                    view_mode: mode,
                    ..self
                };
                (next, ListRender::Rebuild, vec![write])
            }
            ListAction::SetSearch(term) => {
                let term = clamp_search_term(term);
                let write = PrefWrite::new(self.page.search_key(), term.clone());
                let next = ListState {
                    search_term: term,
                    selected: 0,
                    ..self
                };
                (next, ListRender::Rebuild, vec![write])
            }
            ListAction::SetSort(sort) => {
                let write = PrefWrite::new(self.page.sort_key(), sort.as_str());
                let next = ListState {
                    sort,
                    selected: 0,
                    ..self
                };
                (next, ListRender::Rebuild, vec![write])
            }
        }
    }

    /// The filtered, sorted subset of `items` this state shows.
    pub fn visible<'a>(&self, items: &'a [PartnerItem]) -> Vec<&'a PartnerItem> {
        apply_filters_and_sort(items, &self.search_term, self.sort)
    }

    /// Move the selection by `delta`, clamped to `[0, len)`.
    pub fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let max = len - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(max);
    }

    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

fn clamp_search_term(term: String) -> String {
    if term.chars().count() <= MAX_SEARCH_TERM_LENGTH {
        return term;
    }
    term.chars().take(MAX_SEARCH_TERM_LENGTH).collect()
}
