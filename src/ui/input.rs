//! Input handling for the TUI.
//!
//! Keys are resolved through the keybinding registry in the context of
//! whatever has focus: the help overlay, the welcome screen, the search bar,
//! the notification overlay, or the content region.

use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::{App, AppEvent, PageData, Phase};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::listing::{ListAction, PageType, SortMethod, ViewMode};
use crate::util::MAX_SEARCH_TERM_LENGTH;
use crate::view::{ContentView, ListingBody};

use super::helpers::{
    initialize_app, open_link, spawn_bundle_load, spawn_collections_load, spawn_dismiss_timer,
};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Help overlay captures all keys while visible
    if app.show_help {
        return handle_help_input(app, code);
    }

    match app.phase {
        Phase::LoadingBundle => handle_loading_input(app, code, modifiers),
        Phase::Fatal(_) => handle_fatal_input(app, code, modifiers, event_tx),
        Phase::Gate => handle_gate_input(app, code, modifiers, event_tx),
        Phase::Running => {
            if app.search_mode {
                handle_search_input(app, code, modifiers)
            } else if app.notifications.is_open() {
                handle_notifications_input(app, code, modifiers, event_tx)
            } else {
                handle_content_input(app, code, modifiers, event_tx)
            }
        }
    }
}

/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_loading_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Global) {
        Some(KbAction::Quit) => Action::Quit,
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            Action::Continue
        }
        _ => Action::Continue,
    }
}

fn handle_fatal_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Global) {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::Retry) => {
            tracing::info!("Retrying core content load");
            app.phase = Phase::LoadingBundle;
            spawn_bundle_load(app, event_tx);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_gate_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Gate) {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::ConfirmEntry) => {
            if app.confirm_entry() {
                initialize_app(app, event_tx);
            }
        }
        Some(KbAction::ToggleTheme) => {
            let name = app.toggle_theme();
            app.set_status(format!("Theme: {name}"));
        }
        Some(KbAction::ShowHelp) => app.show_help = true,
        _ => {}
    }
    Action::Continue
}

/// Text entry for the search bar. The listing filters on every keystroke.
fn handle_search_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Search) {
        Some(KbAction::ExitSearch) => {
            app.exit_search(false);
            return Action::Continue;
        }
        Some(KbAction::CommitSearch) => {
            app.exit_search(true);
            return Action::Continue;
        }
        _ => {}
    }

    match code {
        KeyCode::Backspace => {
            let mut input = app.search_input.clone();
            if input.pop().is_some() {
                app.update_search(input);
            }
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if app.search_input.chars().count() >= MAX_SEARCH_TERM_LENGTH {
                app.set_status(format!(
                    "Search term at max length ({MAX_SEARCH_TERM_LENGTH} chars)"
                ));
                return Action::Continue;
            }
            let mut input = app.search_input.clone();
            input.push(c);
            app.update_search(input);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_notifications_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Notifications);

    match action {
        Some(KbAction::NavDown) => app.notifications.move_selection(1),
        Some(KbAction::NavUp) => app.notifications.move_selection(-1),
        Some(KbAction::MarkRead) => {
            if let Some(id) = app.notifications.selected_record().map(|n| n.id.clone()) {
                app.notifications.mark_read(&id);
            }
        }
        Some(KbAction::Dismiss) => {
            if let Some(id) = app.notifications.selected_record().map(|n| n.id.clone()) {
                if app.notifications.begin_dismiss(&id) {
                    spawn_dismiss_timer(id, event_tx);
                }
            }
        }
        Some(KbAction::ClearAll) => {
            app.notifications.clear_all();
            tracing::info!("Cleared all notifications");
        }
        Some(KbAction::Back | KbAction::ToggleNotifications) => app.notifications.close(),
        Some(other) => return handle_global_action(app, other, event_tx),
        None => {}
    }
    Action::Continue
}

fn content_context(content: &ContentView) -> KbContext {
    match content {
        ContentView::Listing(_) => KbContext::Listing,
        ContentView::Detail(_) => KbContext::Detail,
        _ => KbContext::Global,
    }
}

fn handle_content_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let context = content_context(&app.content);
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    match action {
        KbAction::NavDown => move_listing(app, Direction::Down),
        KbAction::NavUp => move_listing(app, Direction::Up),
        KbAction::NavLeft => move_listing(app, Direction::Left),
        KbAction::NavRight => move_listing(app, Direction::Right),
        KbAction::Select => {
            if let Some(href) = app.selected_href() {
                app.navigate_to(&href);
            }
        }
        KbAction::Back => {
            if let ContentView::Detail(detail) = &app.content {
                let back = detail.back_href.clone();
                app.navigate_to(&back);
            }
        }
        KbAction::VisitSite => {
            if let ContentView::Detail(detail) = &app.content {
                let link = detail.link.clone();
                open_link(app, &link);
            }
        }
        KbAction::EnterSearch => app.enter_search(),
        KbAction::SortAz => app.apply_list_action(ListAction::SetSort(SortMethod::Az)),
        KbAction::SortZa => app.apply_list_action(ListAction::SetSort(SortMethod::Za)),
        KbAction::ViewList => app.apply_list_action(ListAction::SetViewMode(ViewMode::List)),
        KbAction::ViewGrid => app.apply_list_action(ListAction::SetViewMode(ViewMode::Grid)),
        other => return handle_global_action(app, other, event_tx),
    }
    Action::Continue
}

/// Actions available everywhere once the main view is up.
fn handle_global_action(
    app: &mut App,
    action: KbAction,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::GoLiveTv => app.navigate_to(&PageType::LiveTv.fragment()),
        KbAction::GoOtt => app.navigate_to(&PageType::Ott.fragment()),
        KbAction::GoAbout => app.navigate_to("#about"),
        KbAction::HistoryBack => app.history_back(),
        KbAction::HistoryForward => app.history_forward(),
        KbAction::ToggleNotifications => app.notifications.toggle(),
        KbAction::Retry => {
            if matches!(app.page_data, PageData::Failed(_)) {
                tracing::info!("Retrying partner collections");
                spawn_collections_load(app, event_tx);
            }
        }
        KbAction::ToggleTheme => {
            let name = app.toggle_theme();
            app.set_status(format!("Theme: {name}"));
        }
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        _ => {}
    }
    Action::Continue
}

enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Rows move by one; grid up/down moves by a full row of cards.
fn move_listing(app: &mut App, direction: Direction) {
    let grid = matches!(&app.content, ContentView::Listing(v) if matches!(v.body, ListingBody::Cards(_)));
    let row = if grid { app.grid_columns.max(1) as isize } else { 1 };

    let delta = match direction {
        Direction::Down => row,
        Direction::Up => -row,
        Direction::Left if grid => -1,
        Direction::Right if grid => 1,
        Direction::Left | Direction::Right => return,
    };
    app.move_listing_selection(delta);
}
