use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use ratatui::style::Style;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

use crate::content::{Collections, ContentBundle, LoadError};
use crate::keybindings::KeybindingRegistry;
use crate::listing::{apply_writes, ListAction, ListRender, ListState, PageType};
use crate::net::Fetch;
use crate::notifications::{NotificationCenter, StreamEvent, StreamStatus};
use crate::preferences::{PreferenceManager, PreferenceStore, KEY_HAS_VISITED, KEY_THEME};
use crate::router::{nav_highlight, resolve, FragmentChange, Location, RouteView};
use crate::theme::{StyleMap, ThemeVariant};
use crate::view::{
    about_view, detail_view, header_view, listing_view, not_found_view, partial_error_view,
    ContentView, HeaderView,
};
use crate::worker::WorkerHandle;

/// How long the content region fades in after a navigation.
pub const FADE_IN: Duration = Duration::from_millis(400);

/// Status messages disappear after this long.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Phases
// ============================================================================

/// Where startup has got to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for `content.json`
    LoadingBundle,
    /// `content.json` failed; the whole screen shows this message
    Fatal(&'static str),
    /// First visit: the welcome screen is up
    Gate,
    /// Initialized: collections requested, stream running
    Running,
}

/// The partner collections as far as the UI knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageData {
    NotRequested,
    Loading,
    Failed(&'static str),
    Ready(Collections),
}

/// What to do after `content.json` resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleOutcome {
    Fatal,
    ShowGate,
    Initialize,
}

/// Where the notification stream connects.
#[derive(Clone)]
pub struct StreamTarget {
    pub client: reqwest::Client,
    pub url: Url,
}

// ============================================================================
// Events from background tasks
// ============================================================================

pub enum AppEvent {
    BundleLoaded(Result<ContentBundle, LoadError>),
    /// Both collections (or the error), tagged with the generation of the
    /// load that produced them.
    CollectionsLoaded {
        generation: u64,
        result: Result<Collections, LoadError>,
    },
    Stream(StreamEvent),
    /// The exit animation for a dismissed notification finished.
    DismissAnimationEnded {
        id: String,
    },
    /// A background task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub prefs: PreferenceManager,
    /// Every document request goes through here (the cache worker in
    /// normal runs)
    pub fetch: Arc<dyn Fetch>,
    pub base_url: Url,
    pub stream_target: Option<StreamTarget>,
    pub worker: Option<WorkerHandle>,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    pub phase: Phase,
    pub bundle: Option<ContentBundle>,
    pub page_data: PageData,

    // Generation counter for collection loads; completions from older
    // generations are dropped.
    pub collections_generation: u64,
    pub collections_handle: Option<JoinHandle<()>>,
    pub bundle_handle: Option<JoinHandle<()>>,
    pub stream_handle: Option<JoinHandle<()>>,
    pub stream_status: Option<StreamStatus>,

    pub location: Location,
    pub content: ContentView,
    /// Search/sort/view state of the listing on screen
    pub list_state: Option<ListState>,
    pub notifications: NotificationCenter,

    pub search_mode: bool,
    pub search_input: String,
    /// Term to restore when the search bar is cancelled
    search_before: String,

    pub show_help: bool,
    pub help_scroll_offset: usize,

    pub fade_started: Option<Instant>,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Cards per grid row at the last draw, for left/right/up/down
    pub grid_columns: usize,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(
        prefs: PreferenceManager,
        fetch: Arc<dyn Fetch>,
        base_url: Url,
        keybindings: KeybindingRegistry,
        initial_fragment: &str,
    ) -> Self {
        let theme_variant = ThemeVariant::from_str_name(prefs.theme()).unwrap_or(ThemeVariant::Dark);
        Self {
            prefs,
            fetch,
            base_url,
            stream_target: None,
            worker: None,
            theme_variant,
            theme: StyleMap::for_variant(theme_variant),
            keybindings,
            phase: Phase::LoadingBundle,
            bundle: None,
            page_data: PageData::NotRequested,
            collections_generation: 0,
            collections_handle: None,
            bundle_handle: None,
            stream_handle: None,
            stream_status: None,
            location: Location::new(initial_fragment),
            content: ContentView::Loading,
            list_state: None,
            notifications: NotificationCenter::default(),
            search_mode: false,
            search_input: String::new(),
            search_before: String::new(),
            show_help: false,
            help_scroll_offset: 0,
            fade_started: None,
            status_message: None,
            grid_columns: 1,
            needs_redraw: true,
        }
    }

    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::for_variant(variant);
        self.needs_redraw = true;
    }

    /// Flip dark/light and persist the choice. Returns the new theme name.
    pub fn toggle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        self.prefs.set(KEY_THEME, next.as_pref());
        next.name()
    }

    /// Saved theme, else the configured default.
    fn apply_saved_theme(&mut self) {
        let variant = ThemeVariant::from_str_name(self.prefs.theme()).unwrap_or(ThemeVariant::Dark);
        self.set_theme(variant);
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, at)) = &self.status_message {
            if at.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn is_fading(&self) -> bool {
        self.fade_started.is_some_and(|t| t.elapsed() < FADE_IN)
    }

    pub fn header(&self) -> HeaderView {
        let route = self.location.route();
        header_view(
            self.bundle.as_ref().and_then(|b| b.app_branding.as_ref()),
            nav_highlight(&route),
            self.notifications.has_unread(),
            self.theme_variant.name(),
        )
    }

    // ========================================================================
    // Startup
    // ========================================================================

    /// Take in the `content.json` result and decide what comes next.
    pub fn accept_bundle(&mut self, result: Result<ContentBundle, LoadError>) -> BundleOutcome {
        self.bundle_handle = None;
        match result {
            Ok(bundle) => {
                self.notifications = NotificationCenter::new(bundle.notifications.clone());
                self.bundle = Some(bundle);
                if self.prefs.has_visited() {
                    BundleOutcome::Initialize
                } else {
                    self.phase = Phase::Gate;
                    BundleOutcome::ShowGate
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not load core content");
                self.phase = Phase::Fatal(e.user_message());
                BundleOutcome::Fatal
            }
        }
    }

    /// Welcome-screen confirm. Returns `true` the first time only; the
    /// caller then initializes.
    pub fn confirm_entry(&mut self) -> bool {
        if self.prefs.has_visited() {
            return false;
        }
        self.prefs.set(KEY_HAS_VISITED, "true");
        true
    }

    /// Enter the running phase. Spawning the loads is up to the caller.
    pub fn mark_initialized(&mut self) {
        self.phase = Phase::Running;
        self.apply_saved_theme();
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Start a new collection load generation and show the loading
    /// placeholder. Returns the generation to tag the load with.
    pub fn begin_collections_load(&mut self) -> u64 {
        if let Some(handle) = self.collections_handle.take() {
            handle.abort();
        }
        self.collections_generation = self.collections_generation.wrapping_add(1);
        self.page_data = PageData::Loading;
        self.content = ContentView::Loading;
        self.list_state = None;
        self.collections_generation
    }

    /// Publish a finished load. Returns `false` for a stale generation,
    /// which is ignored.
    pub fn accept_collections(
        &mut self,
        generation: u64,
        result: Result<Collections, LoadError>,
    ) -> bool {
        if generation != self.collections_generation {
            tracing::debug!(
                generation,
                current = self.collections_generation,
                "Discarding stale collection load"
            );
            return false;
        }
        self.collections_handle = None;

        match result {
            Ok(collections) => {
                self.page_data = PageData::Ready(collections);
                self.route_current();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load page data");
                let message = e.user_message();
                self.page_data = PageData::Failed(message);
                self.list_state = None;
                self.content = ContentView::PartialError(partial_error_view(message));
            }
        }
        true
    }

    pub fn collections(&self) -> Option<&Collections> {
        match &self.page_data {
            PageData::Ready(c) => Some(c),
            _ => None,
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn navigate_to(&mut self, fragment: &str) {
        if let Some(change) = self.location.navigate_to(fragment) {
            self.on_fragment_change(change);
        }
    }

    pub fn history_back(&mut self) {
        if !self.location.can_go_back() {
            self.set_status("Already at the first page");
            return;
        }
        if let Some(change) = self.location.back() {
            self.on_fragment_change(change);
        }
    }

    pub fn history_forward(&mut self) {
        if let Some(change) = self.location.forward() {
            self.on_fragment_change(change);
        }
    }

    pub fn on_fragment_change(&mut self, change: FragmentChange) {
        tracing::debug!(fragment = %change.fragment, "Fragment changed");
        self.route_current();
    }

    /// Resolve the current fragment and rebuild the content region.
    ///
    /// Until collections are ready only the overlay closes; the route is
    /// resolved once they arrive.
    fn route_current(&mut self) {
        self.notifications.close();
        self.exit_search(false);
        self.needs_redraw = true;

        let Some(collections) = self.collections().cloned() else {
            return;
        };

        if !self.content.is_loading() {
            self.fade_started = Some(Instant::now());
        }

        match resolve(&self.location.route(), &collections) {
            RouteView::Listing(page) => {
                let state = ListState::enter(page, &self.prefs);
                self.content = ContentView::Listing(listing_view(page.items(&collections), &state));
                self.list_state = Some(state);
            }
            RouteView::Detail { item, page } => {
                self.list_state = None;
                self.content = ContentView::Detail(detail_view(&item, page));
            }
            RouteView::NotFound => {
                self.list_state = None;
                self.content = ContentView::NotFound(not_found_view());
            }
            RouteView::About => {
                self.list_state = None;
                let about = self
                    .bundle
                    .as_ref()
                    .map(|b| about_view(&b.about_page))
                    .unwrap_or_else(|| about_view(&Default::default()));
                self.content = ContentView::About(about);
            }
            RouteView::Keep => {}
        }
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Page of the listing on screen, if one is.
    pub fn current_list_page(&self) -> Option<PageType> {
        self.list_state.as_ref().map(|s| s.page)
    }

    /// Rebuild the listing view from the current state. Filtering and
    /// sorting run again every time.
    pub fn refresh_listing(&mut self) {
        let (Some(state), Some(collections)) = (self.list_state.as_ref(), self.collections()) else {
            return;
        };
        let view = listing_view(state.page.items(collections), state);
        self.content = ContentView::Listing(view);
        self.needs_redraw = true;
    }

    pub fn apply_list_action(&mut self, action: ListAction) {
        let Some(state) = self.list_state.take() else {
            return;
        };
        let (next, render, writes) = state.reduce(action);
        apply_writes(&mut self.prefs, &writes);
        self.list_state = Some(next);
        if render == ListRender::Rebuild {
            self.refresh_listing();
        }
    }

    pub fn move_listing_selection(&mut self, delta: isize) {
        let len = match &self.content {
            ContentView::Listing(view) => view.len(),
            _ => return,
        };
        if let Some(state) = self.list_state.as_mut() {
            state.move_selection(delta, len);
        }
        self.refresh_listing();
    }

    /// Fragment of the highlighted listing entry.
    pub fn selected_href(&self) -> Option<String> {
        match &self.content {
            ContentView::Listing(view) => view.href_at(view.selected).map(str::to_string),
            _ => None,
        }
    }

    pub fn enter_search(&mut self) {
        let Some(state) = &self.list_state else {
            return;
        };
        self.search_before = state.search_term.clone();
        self.search_input = state.search_term.clone();
        self.search_mode = true;
    }

    /// Live update while typing: the listing follows every keystroke.
    pub fn update_search(&mut self, input: String) {
        self.search_input = input;
        self.apply_list_action(ListAction::SetSearch(self.search_input.clone()));
    }

    /// Leave the search bar, keeping the term or restoring the one it
    /// started with.
    pub fn exit_search(&mut self, keep: bool) {
        if !self.search_mode {
            return;
        }
        self.search_mode = false;
        if !keep && self.search_input != self.search_before {
            let before = std::mem::take(&mut self.search_before);
            self.apply_list_action(ListAction::SetSearch(before));
        }
        self.search_input.clear();
        self.search_before.clear();
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub fn accept_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Notifications(records) => {
                if self.notifications.replace_if_changed(records) {
                    tracing::info!(
                        count = self.notifications.records().len(),
                        unread = self.notifications.unread_count(),
                        "Notifications updated"
                    );
                }
            }
            StreamEvent::Status(status) => {
                if status == StreamStatus::Closed {
                    self.set_status("Live notifications unavailable");
                }
                self.stream_status = Some(status);
            }
        }
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

impl Drop for App {
    fn drop(&mut self) {
        for (name, handle) in [
            ("bundle load", self.bundle_handle.take()),
            ("collections load", self.collections_handle.take()),
            ("notification stream", self.stream_handle.take()),
        ] {
            if let Some(handle) = handle {
                handle.abort();
                tracing::debug!(task = name, "Aborted task on App drop");
            }
        }
    }
}
