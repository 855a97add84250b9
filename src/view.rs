//! View trees: plain data describing what a screen shows, built from content
//! and state by pure functions and drawn by `ui`.
//!
//! Every string that originates in remote JSON passes through
//! [`strip_control_chars`] here, so the draw code never sees escape
//! sequences.
use crate::content::{
    AboutPage, AppBranding, EntryScreen, NotificationKind, NotificationRecord, PartnerItem,
};
use crate::listing::{ListState, PageType, SortMethod, ViewMode, EMPTY_LISTING_MESSAGE};
use crate::notifications::{NotificationCenter, EMPTY_NOTIFICATIONS_MESSAGE};
use crate::router::{detail_fragment, NAV_PAGES};
use crate::util::strip_control_chars;

pub const NOT_FOUND_TITLE: &str = "Not Found";
pub const PARTIAL_ERROR_TITLE: &str = "Error";
pub const BACK_LABEL: &str = "Back to list";
pub const VISIT_LABEL: &str = "Visit Site";
pub const SEARCH_PLACEHOLDER: &str = "Search partners...";

fn clean(s: &str) -> String {
    strip_control_chars(s).into_owned()
}

// ============================================================================
// Header
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub page: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    /// `(name, tagline)`; absent when the bundle has no branding
    pub brand: Option<(String, String)>,
    pub nav: Vec<NavItem>,
    pub bell_dot: bool,
    pub theme_name: &'static str,
}

fn nav_label(page: &str) -> &'static str {
    match page {
        "live-tv" => "Live TV",
        "ott" => "OTT",
        _ => "About",
    }
}

pub fn header_view(
    branding: Option<&AppBranding>,
    active_page: Option<&str>,
    bell_dot: bool,
    theme_name: &'static str,
) -> HeaderView {
    HeaderView {
        brand: branding.map(|b| (clean(&b.name), clean(&b.tagline))),
        nav: NAV_PAGES
            .iter()
            .map(|&page| NavItem {
                page,
                label: nav_label(page),
                active: active_page == Some(page),
            })
            .collect(),
        bell_dot,
        theme_name,
    }
}

// ============================================================================
// Listing
// ============================================================================

/// One row of the list layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerRow {
    pub logo: String,
    pub name: String,
    pub category: String,
    pub href: String,
}

/// One card of the grid layout: logo and name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerCard {
    pub logo: String,
    pub name: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingBody {
    Rows(Vec<PartnerRow>),
    Cards(Vec<PartnerCard>),
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingView {
    pub title: &'static str,
    pub page: PageType,
    pub view_mode: ViewMode,
    pub sort: SortMethod,
    pub search_term: String,
    pub body: ListingBody,
    pub selected: usize,
}

impl ListingView {
    pub fn len(&self) -> usize {
        match &self.body {
            ListingBody::Rows(rows) => rows.len(),
            ListingBody::Cards(cards) => cards.len(),
            ListingBody::Empty(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn href_at(&self, index: usize) -> Option<&str> {
        match &self.body {
            ListingBody::Rows(rows) => rows.get(index).map(|r| r.href.as_str()),
            ListingBody::Cards(cards) => cards.get(index).map(|c| c.href.as_str()),
            ListingBody::Empty(_) => None,
        }
    }
}

/// Build a listing: chrome from `state`, body from the filtered items.
pub fn listing_view(items: &[PartnerItem], state: &ListState) -> ListingView {
    let page = state.page;
    let visible = state.visible(items);

    let body = if visible.is_empty() {
        ListingBody::Empty(EMPTY_LISTING_MESSAGE)
    } else {
        match state.view_mode {
            ViewMode::List => ListingBody::Rows(
                visible
                    .iter()
                    .map(|item| PartnerRow {
                        logo: clean(&item.logo_url),
                        name: clean(&item.name),
                        category: clean(&item.category),
                        href: detail_fragment(page, item),
                    })
                    .collect(),
            ),
            ViewMode::Grid => ListingBody::Cards(
                visible
                    .iter()
                    .map(|item| PartnerCard {
                        logo: clean(&item.logo_url),
                        name: clean(&item.name),
                        href: detail_fragment(page, item),
                    })
                    .collect(),
            ),
        }
    };

    ListingView {
        title: page.title(),
        page,
        view_mode: state.view_mode,
        sort: state.sort,
        search_term: clean(&state.search_term),
        selected: state.selected.min(visible.len().saturating_sub(1)),
        body,
    }
}

// ============================================================================
// Detail / About / Not found / Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub name: String,
    pub category: String,
    pub description: String,
    pub logo: String,
    /// Raw link; validated before it is opened
    pub link: String,
    pub back_href: String,
    pub back_label: &'static str,
    pub visit_label: &'static str,
}

pub fn detail_view(item: &PartnerItem, page: PageType) -> DetailView {
    DetailView {
        name: clean(&item.name),
        category: clean(&item.category),
        description: clean(&item.description),
        logo: clean(&item.logo_url),
        link: clean(&item.link),
        back_href: page.fragment(),
        back_label: BACK_LABEL,
        visit_label: VISIT_LABEL,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutBlock {
    pub heading: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutView {
    pub title: String,
    pub sections: Vec<AboutBlock>,
    /// `(label, address)` pairs
    pub contacts: Vec<(&'static str, String)>,
}

pub fn about_view(about: &AboutPage) -> AboutView {
    let block = |heading: &str, text: &str| AboutBlock {
        heading: clean(heading),
        text: clean(text),
    };
    AboutView {
        title: clean(&about.title),
        sections: vec![
            block(&about.mission.heading, &about.mission.text),
            block(&about.vision.heading, &about.vision.text),
            block(&about.contact.heading, &about.contact.text),
        ],
        contacts: vec![
            ("General Inquiries", clean(&about.contact.email_general)),
            ("Partnerships", clean(&about.contact.email_partners)),
        ],
    }
}

/// Title plus optional explanatory line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub title: &'static str,
    pub message: Option<&'static str>,
}

pub fn not_found_view() -> MessageView {
    MessageView {
        title: NOT_FOUND_TITLE,
        message: None,
    }
}

pub fn partial_error_view(message: &'static str) -> MessageView {
    MessageView {
        title: PARTIAL_ERROR_TITLE,
        message: Some(message),
    }
}

// ============================================================================
// Content region
// ============================================================================

/// What the content region shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentView {
    Loading,
    Listing(ListingView),
    Detail(DetailView),
    About(AboutView),
    NotFound(MessageView),
    PartialError(MessageView),
}

impl ContentView {
    pub fn is_loading(&self) -> bool {
        matches!(self, ContentView::Loading)
    }
}

// ============================================================================
// Gate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateView {
    pub title: String,
    pub info: String,
    pub button_text: String,
}

pub fn gate_view(entry: &EntryScreen) -> GateView {
    GateView {
        title: clean(&entry.title),
        info: clean(&entry.info),
        button_text: clean(&entry.button_text),
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEntry {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub unread: bool,
    pub dismissing: bool,
    /// Only unread entries offer "Mark as Read"
    pub can_mark_read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationsView {
    Entries {
        entries: Vec<NotificationEntry>,
        selected: usize,
    },
    Empty(&'static str),
}

fn notification_entry(record: &NotificationRecord, center: &NotificationCenter) -> NotificationEntry {
    NotificationEntry {
        id: record.id.clone(),
        kind: record.kind,
        title: clean(&record.title),
        message: clean(&record.message),
        unread: !record.is_read,
        dismissing: center.is_dismissing(&record.id),
        can_mark_read: !record.is_read,
    }
}

pub fn notifications_view(center: &NotificationCenter) -> NotificationsView {
    if center.is_empty() {
        return NotificationsView::Empty(EMPTY_NOTIFICATIONS_MESSAGE);
    }
    NotificationsView::Entries {
        entries: center
            .records()
            .iter()
            .map(|record| notification_entry(record, center))
            .collect(),
        selected: center.selected(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{PreferenceManager, PreferenceStore};
    use pretty_assertions::assert_eq;

    fn item(id: &str, name: &str) -> PartnerItem {
        PartnerItem {
            id: id.to_string(),
            name: name.to_string(),
            category: "Movies".to_string(),
            logo_url: "logos/x.png".to_string(),
            link: "https://example.com".to_string(),
            description: "A streaming service".to_string(),
        }
    }

    #[test]
    fn test_list_rows_link_to_detail() {
        let prefs = PreferenceManager::in_memory();
        let state = ListState::enter(PageType::Ott, &prefs);
        let view = listing_view(&[item("n1", "Netflix")], &state);

        assert_eq!(view.title, "OTT Platforms");
        assert_eq!(
            view.body,
            ListingBody::Rows(vec![PartnerRow {
                logo: "logos/x.png".to_string(),
                name: "Netflix".to_string(),
                category: "Movies".to_string(),
                href: "#ott/n1".to_string(),
            }])
        );
        assert_eq!(view.href_at(0), Some("#ott/n1"));
    }

    #[test]
    fn test_grid_cards_have_no_category() {
        let mut prefs = PreferenceManager::in_memory();
        prefs.set("viewPreference", "grid");
        let state = ListState::enter(PageType::LiveTv, &prefs);
        let view = listing_view(&[item("1", "Star")], &state);

        assert!(matches!(view.body, ListingBody::Cards(ref cards) if cards[0].href == "#live-tv/1"));
    }

    #[test]
    fn test_empty_listing_placeholder() {
        let prefs = PreferenceManager::in_memory();
        let state = ListState::enter(PageType::LiveTv, &prefs);
        let view = listing_view(&[], &state);
        assert_eq!(view.body, ListingBody::Empty("No partners found."));
        assert!(view.is_empty());
    }

    #[test]
    fn test_fields_are_sanitized() {
        let mut evil = item("1", "Evil\x1b]0;pwned\x07 TV");
        evil.description = "\x1b[2Jcleared".to_string();
        let detail = detail_view(&evil, PageType::LiveTv);
        assert_eq!(detail.name, "Evil TV");
        assert_eq!(detail.description, "cleared");
        assert_eq!(detail.back_href, "#live-tv");
        assert_eq!(detail.visit_label, "Visit Site");
    }

    #[test]
    fn test_header_highlight_and_branding() {
        let branding = AppBranding {
            name: "RetroFlix".to_string(),
            tagline: "Partners".to_string(),
        };
        let header = header_view(Some(&branding), Some("ott"), true, "dark");
        let active: Vec<&str> = header.nav.iter().filter(|n| n.active).map(|n| n.page).collect();
        assert_eq!(active, ["ott"]);
        assert!(header.bell_dot);

        let header = header_view(None, None, false, "light");
        assert!(header.brand.is_none());
        assert!(header.nav.iter().all(|n| !n.active));
    }

    #[test]
    fn test_notifications_view() {
        let mut center = NotificationCenter::new(vec![NotificationRecord {
            id: "1".to_string(),
            title: "Hi".to_string(),
            message: "m".to_string(),
            kind: NotificationKind::Alert,
            is_read: false,
        }]);
        match notifications_view(&center) {
            NotificationsView::Entries { entries, .. } => {
                assert!(entries[0].can_mark_read);
                assert!(!entries[0].dismissing);
            }
            other => panic!("unexpected {other:?}"),
        }

        center.clear_all();
        assert_eq!(
            notifications_view(&center),
            NotificationsView::Empty("No new notifications.")
        );
    }

    #[test]
    fn test_message_views() {
        assert_eq!(not_found_view().title, "Not Found");
        let partial = partial_error_view("Could not load");
        assert_eq!(partial.title, "Error");
        assert_eq!(partial.message, Some("Could not load"));
    }
}
