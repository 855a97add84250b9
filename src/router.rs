//! Fragment router.
//!
//! The location fragment is the only navigation state. [`Location`] keeps it
//! together with back/forward history and reports every change as a
//! [`FragmentChange`]; [`resolve`] turns the parsed [`Route`] into the view
//! to show.
use crate::content::{Collections, PartnerItem};
use crate::listing::PageType;

pub const DEFAULT_PAGE: &str = "live-tv";

/// Page names that have a navigation item.
pub const NAV_PAGES: [&str; 3] = ["live-tv", "ott", "about"];

// ============================================================================
// Route
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub page: String,
    pub item_id: Option<String>,
}

/// Parse `#page` or `#page/id`.
///
/// The `#` is optional. Only the first `/` splits, so ids may contain more
/// slashes. An empty id means none; an empty fragment means `live-tv`.
pub fn parse_fragment(fragment: &str) -> Route {
    let raw = fragment.strip_prefix('#').unwrap_or(fragment);
    let (page, id) = match raw.split_once('/') {
        Some((page, id)) => (page, Some(id)),
        None => (raw, None),
    };

    let page = if page.is_empty() { DEFAULT_PAGE } else { page };
    Route {
        page: page.to_string(),
        item_id: id.filter(|id| !id.is_empty()).map(str::to_string),
    }
}

/// Fragment of the detail view for `item` on `page`.
pub fn detail_fragment(page: PageType, item: &PartnerItem) -> String {
    format!("#{}/{}", page.key(), item.id)
}

// ============================================================================
// Resolution
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteView {
    Listing(PageType),
    Detail { item: PartnerItem, page: PageType },
    NotFound,
    About,
    /// `#notifications`: the overlay is not a page, keep the current view
    Keep,
}

/// Decide which view `route` shows.
pub fn resolve(route: &Route, collections: &Collections) -> RouteView {
    if let Some(id) = &route.item_id {
        let page = PageType::for_page(&route.page);
        return match page.items(collections).iter().find(|item| &item.id == id) {
            Some(item) => RouteView::Detail {
                item: item.clone(),
                page,
            },
            None => {
                tracing::debug!(page = %route.page, id = %id, "Route item not found");
                RouteView::NotFound
            }
        };
    }

    match route.page.as_str() {
        "live-tv" => RouteView::Listing(PageType::LiveTv),
        "ott" => RouteView::Listing(PageType::Ott),
        "about" => RouteView::About,
        "notifications" => RouteView::Keep,
        _ => RouteView::Listing(PageType::LiveTv),
    }
}

/// Navigation item to highlight: the raw page name if it has one.
pub fn nav_highlight(route: &Route) -> Option<&'static str> {
    NAV_PAGES.iter().copied().find(|page| *page == route.page)
}

// ============================================================================
// Location
// ============================================================================

/// Emitted whenever the fragment changes, however it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentChange {
    pub fragment: String,
}

/// Current fragment plus back/forward history.
#[derive(Debug, Clone)]
pub struct Location {
    current: String,
    back: Vec<String>,
    forward: Vec<String>,
}

const MAX_HISTORY: usize = 100;

impl Location {
    pub fn new(initial: &str) -> Self {
        Self {
            current: normalize(initial),
            back: Vec::new(),
            forward: Vec::new(),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.current
    }

    pub fn route(&self) -> Route {
        parse_fragment(&self.current)
    }

    /// Go to `fragment`. Navigating to the current fragment changes nothing.
    pub fn navigate_to(&mut self, fragment: &str) -> Option<FragmentChange> {
        let next = normalize(fragment);
        if next == self.current {
            return None;
        }
        let prev = std::mem::replace(&mut self.current, next);
        self.back.push(prev);
        if self.back.len() > MAX_HISTORY {
            self.back.remove(0);
        }
        self.forward.clear();
        Some(self.change())
    }

    pub fn back(&mut self) -> Option<FragmentChange> {
        let prev = self.back.pop()?;
        let current = std::mem::replace(&mut self.current, prev);
        self.forward.push(current);
        Some(self.change())
    }

    pub fn forward(&mut self) -> Option<FragmentChange> {
        let next = self.forward.pop()?;
        let current = std::mem::replace(&mut self.current, next);
        self.back.push(current);
        Some(self.change())
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    fn change(&self) -> FragmentChange {
        FragmentChange {
            fragment: self.current.clone(),
        }
    }
}

fn normalize(fragment: &str) -> String {
    if fragment.starts_with('#') {
        fragment.to_string()
    } else {
        format!("#{fragment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn route(page: &str, id: Option<&str>) -> Route {
        Route {
            page: page.to_string(),
            item_id: id.map(str::to_string),
        }
    }

    fn item(id: &str, name: &str) -> PartnerItem {
        PartnerItem {
            id: id.to_string(),
            name: name.to_string(),
            category: "News".to_string(),
            logo_url: String::new(),
            link: "https://example.com".to_string(),
            description: "d".to_string(),
        }
    }

    fn collections() -> Collections {
        Collections {
            tv: Arc::new(vec![item("abc123", "Aaj Tak")]),
            ott: Arc::new(vec![item("n1", "Netflix"), item("a/b", "Slashy")]),
        }
    }

    #[test]
    fn test_parse_fragment() {
        assert_eq!(parse_fragment(""), route("live-tv", None));
        assert_eq!(parse_fragment("#"), route("live-tv", None));
        assert_eq!(parse_fragment("#ott"), route("ott", None));
        assert_eq!(parse_fragment("ott"), route("ott", None));
        assert_eq!(parse_fragment("#ott/"), route("ott", None));
        assert_eq!(parse_fragment("#live-tv/abc123"), route("live-tv", Some("abc123")));
        assert_eq!(parse_fragment("#ott/a/b"), route("ott", Some("a/b")));
    }

    #[test]
    fn test_resolve_detail_and_not_found() {
        let c = collections();
        assert_eq!(
            resolve(&parse_fragment("#live-tv/abc123"), &c),
            RouteView::Detail {
                item: item("abc123", "Aaj Tak"),
                page: PageType::LiveTv
            }
        );
        assert_eq!(resolve(&parse_fragment("#live-tv/zzz"), &c), RouteView::NotFound);
        // Wrong collection for the id
        assert_eq!(resolve(&parse_fragment("#ott/abc123"), &c), RouteView::NotFound);
    }

    #[test]
    fn test_unknown_page_with_id_uses_ott_collection() {
        let c = collections();
        assert!(matches!(
            resolve(&parse_fragment("#whatever/n1"), &c),
            RouteView::Detail { page: PageType::Ott, .. }
        ));
        assert!(matches!(
            resolve(&parse_fragment("#ott/a/b"), &c),
            RouteView::Detail { .. }
        ));
    }

    #[test]
    fn test_resolve_pages() {
        let c = collections();
        assert_eq!(resolve(&parse_fragment("#live-tv"), &c), RouteView::Listing(PageType::LiveTv));
        assert_eq!(resolve(&parse_fragment("#ott"), &c), RouteView::Listing(PageType::Ott));
        assert_eq!(resolve(&parse_fragment("#about"), &c), RouteView::About);
        assert_eq!(resolve(&parse_fragment("#notifications"), &c), RouteView::Keep);
        assert_eq!(resolve(&parse_fragment("#bogus"), &c), RouteView::Listing(PageType::LiveTv));
    }

    #[test]
    fn test_nav_highlight_by_raw_page() {
        assert_eq!(nav_highlight(&parse_fragment("#ott/n1")), Some("ott"));
        assert_eq!(nav_highlight(&parse_fragment("")), Some("live-tv"));
        assert_eq!(nav_highlight(&parse_fragment("#bogus")), None);
        assert_eq!(nav_highlight(&parse_fragment("#notifications")), None);
    }

    #[test]
    fn test_location_history() {
        let mut loc = Location::new("live-tv");
        assert_eq!(loc.fragment(), "#live-tv");
        assert!(loc.navigate_to("#live-tv").is_none());

        let change = loc.navigate_to("#ott").unwrap();
        assert_eq!(change.fragment, "#ott");
        loc.navigate_to("#ott/n1");

        assert_eq!(loc.back().unwrap().fragment, "#ott");
        assert_eq!(loc.back().unwrap().fragment, "#live-tv");
        assert!(loc.back().is_none());

        assert_eq!(loc.forward().unwrap().fragment, "#ott");
        loc.navigate_to("#about");
        assert!(loc.forward().is_none());
        assert_eq!(loc.route(), route("about", None));
    }

    #[test]
    fn test_detail_fragment() {
        assert_eq!(detail_fragment(PageType::Ott, &item("n1", "Netflix")), "#ott/n1");
    }
}
