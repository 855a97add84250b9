//! Keybinding registry: maps key events to actions per context, with
//! overrides from `[keybindings]` in config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavLeft,
    NavRight,
    Select,
    Back,
    GoLiveTv,
    GoOtt,
    GoAbout,
    HistoryBack,
    HistoryForward,
    ToggleNotifications,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    SortAz,
    SortZa,
    ViewList,
    ViewGrid,
    VisitSite,
    Retry,
    ToggleTheme,
    ShowHelp,
    MarkRead,
    Dismiss,
    ClearAll,
    ConfirmEntry,
}

impl Action {
    /// Description for the help overlay.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Move selection down",
            Self::NavUp => "Move selection up",
            Self::NavLeft => "Move selection left (grid)",
            Self::NavRight => "Move selection right (grid)",
            Self::Select => "Open selected partner",
            Self::Back => "Back to list / close overlay",
            Self::GoLiveTv => "Go to Live TV",
            Self::GoOtt => "Go to OTT",
            Self::GoAbout => "Go to About",
            Self::HistoryBack => "History back",
            Self::HistoryForward => "History forward",
            Self::ToggleNotifications => "Toggle notifications",
            Self::EnterSearch => "Search partners",
            Self::ExitSearch => "Leave search bar",
            Self::CommitSearch => "Apply search",
            Self::SortAz => "Sort A-Z",
            Self::SortZa => "Sort Z-A",
            Self::ViewList => "List layout",
            Self::ViewGrid => "Grid layout",
            Self::VisitSite => "Visit partner site",
            Self::Retry => "Retry loading page data",
            Self::ToggleTheme => "Toggle dark/light theme",
            Self::ShowHelp => "Show help",
            Self::MarkRead => "Mark notification read",
            Self::Dismiss => "Dismiss notification",
            Self::ClearAll => "Clear all notifications",
            Self::ConfirmEntry => "Enter the app",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Which bindings are active. Lookups fall back to `Global`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Listing,
    Detail,
    Notifications,
    Search,
    Gate,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Listing => "Partner list",
            Self::Detail => "Partner detail",
            Self::Notifications => "Notifications",
            Self::Search => "Search bar",
            Self::Gate => "Welcome screen",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config.
///
/// Accepts single characters (`"q"`, `"/"`), named keys (`"Enter"`, `"Esc"`,
/// `"Left"`, `"space"`...), `"Ctrl+x"` and `"F1"`..`"F12"`.
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    };

    format!("{modifier}{key_name}")
}

// ============================================================================
// Keybinding Registry
// ============================================================================

pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for the help overlay
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action::*;
        use Context::*;

        let defaults: &[(Context, KeySpec, Action)] = &[
            // Global
            (Global, KeySpec::ch('q'), Quit),
            (Global, KeySpec::ch('j'), NavDown),
            (Global, KeySpec::plain(KeyCode::Down), NavDown),
            (Global, KeySpec::ch('k'), NavUp),
            (Global, KeySpec::plain(KeyCode::Up), NavUp),
            (Global, KeySpec::plain(KeyCode::Enter), Select),
            (Global, KeySpec::plain(KeyCode::Esc), Back),
            (Global, KeySpec::ch('1'), GoLiveTv),
            (Global, KeySpec::ch('2'), GoOtt),
            (Global, KeySpec::ch('3'), GoAbout),
            (Global, KeySpec::ch('['), HistoryBack),
            (Global, KeySpec::ch(']'), HistoryForward),
            (Global, KeySpec::ch('n'), ToggleNotifications),
            (Global, KeySpec::ch('r'), Retry),
            (Global, KeySpec::ch('t'), ToggleTheme),
            (Global, KeySpec::ch('?'), ShowHelp),
            // Partner list
            (Listing, KeySpec::ch('/'), EnterSearch),
            (Listing, KeySpec::ch('a'), SortAz),
            (Listing, KeySpec::ch('z'), SortZa),
            (Listing, KeySpec::ch('L'), ViewList),
            (Listing, KeySpec::ch('G'), ViewGrid),
            (Listing, KeySpec::ch('h'), NavLeft),
            (Listing, KeySpec::plain(KeyCode::Left), NavLeft),
            (Listing, KeySpec::ch('l'), NavRight),
            (Listing, KeySpec::plain(KeyCode::Right), NavRight),
            // Partner detail
            (Detail, KeySpec::ch('o'), VisitSite),
            (Detail, KeySpec::ch('b'), Back),
            // Notification overlay
            (Notifications, KeySpec::ch('m'), MarkRead),
            (Notifications, KeySpec::ch('d'), Dismiss),
            (Notifications, KeySpec::ch('c'), ClearAll),
            // Search bar
            (Search, KeySpec::plain(KeyCode::Esc), ExitSearch),
            (Search, KeySpec::plain(KeyCode::Enter), CommitSearch),
            // Welcome screen
            (Gate, KeySpec::plain(KeyCode::Enter), ConfirmEntry),
            (Gate, KeySpec::ch(' '), ConfirmEntry),
        ];

        for &(context, key, action) in defaults {
            self.bind(context, key, action);
        }
    }

    /// Apply `action_name = "key"` overrides from config.
    ///
    /// The action keeps the contexts it was bound in; only the key changes.
    /// Returns one warning per entry that could not be applied.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{action_name}', ignoring"));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{key_str}' for action '{action_name}', ignoring"
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up `code`+`modifiers` in `context`, falling back to `Global`.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);
        self.lookup
            .get(&(context, key))
            .or_else(|| {
                (context != Context::Global)
                    .then(|| self.lookup.get(&(Context::Global, key)))
                    .flatten()
            })
            .copied()
    }

    /// `(context, key label, action, description)` for every binding.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_action_name(name: &str) -> Option<Action> {
    let action = match name.to_lowercase().as_str() {
        "quit" => Action::Quit,
        "nav_down" | "down" => Action::NavDown,
        "nav_up" | "up" => Action::NavUp,
        "nav_left" | "left" => Action::NavLeft,
        "nav_right" | "right" => Action::NavRight,
        "select" | "open" => Action::Select,
        "back" => Action::Back,
        "live_tv" | "go_live_tv" => Action::GoLiveTv,
        "ott" | "go_ott" => Action::GoOtt,
        "about" | "go_about" => Action::GoAbout,
        "history_back" => Action::HistoryBack,
        "history_forward" => Action::HistoryForward,
        "notifications" | "toggle_notifications" => Action::ToggleNotifications,
        "search" | "enter_search" => Action::EnterSearch,
        "exit_search" => Action::ExitSearch,
        "commit_search" => Action::CommitSearch,
        "sort_az" => Action::SortAz,
        "sort_za" => Action::SortZa,
        "view_list" => Action::ViewList,
        "view_grid" => Action::ViewGrid,
        "visit_site" | "visit" => Action::VisitSite,
        "retry" => Action::Retry,
        "theme" | "toggle_theme" => Action::ToggleTheme,
        "help" | "show_help" => Action::ShowHelp,
        "mark_read" => Action::MarkRead,
        "dismiss" => Action::Dismiss,
        "clear_all" => Action::ClearAll,
        "confirm_entry" | "enter_app" => Action::ConfirmEntry,
        _ => return None,
    };
    Some(action)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(reg: &KeybindingRegistry, c: char, ctx: Context) -> Option<Action> {
        reg.action_for_key(KeyCode::Char(c), KeyModifiers::NONE, ctx)
    }

    #[test]
    fn test_default_global_bindings() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, 'q', Context::Global), Some(Action::Quit));
        assert_eq!(key(&reg, '1', Context::Global), Some(Action::GoLiveTv));
        assert_eq!(key(&reg, '2', Context::Global), Some(Action::GoOtt));
        assert_eq!(key(&reg, '3', Context::Global), Some(Action::GoAbout));
        assert_eq!(key(&reg, 'n', Context::Global), Some(Action::ToggleNotifications));
        assert_eq!(
            reg.action_for_key(KeyCode::Down, KeyModifiers::NONE, Context::Global),
            Some(Action::NavDown)
        );
    }

    #[test]
    fn test_context_falls_back_to_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, 'j', Context::Listing), Some(Action::NavDown));
        assert_eq!(key(&reg, 't', Context::Detail), Some(Action::ToggleTheme));
        assert_eq!(key(&reg, 'q', Context::Notifications), Some(Action::Quit));
    }

    #[test]
    fn test_context_specific_bindings_stay_local() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, 'o', Context::Detail), Some(Action::VisitSite));
        assert_eq!(key(&reg, 'o', Context::Listing), None);
        assert_eq!(key(&reg, 'd', Context::Notifications), Some(Action::Dismiss));
        assert_eq!(key(&reg, 'd', Context::Listing), None);
        assert_eq!(key(&reg, '/', Context::Listing), Some(Action::EnterSearch));
        assert_eq!(key(&reg, '/', Context::Detail), None);
    }

    #[test]
    fn test_search_context_overrides_global_esc() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Search),
            Some(Action::ExitSearch)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Listing),
            Some(Action::Back)
        );
    }

    #[test]
    fn test_gate_confirm() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Gate),
            Some(Action::ConfirmEntry)
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::F(12), KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_apply_overrides_moves_key() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("quit".to_string(), "Ctrl+q".to_string())]);

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());
        assert_eq!(key(&reg, 'q', Context::Global), None);
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::Global),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_override_keeps_context() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("visit_site".to_string(), "w".to_string())]);

        assert!(reg.apply_overrides(&overrides).is_empty());
        assert_eq!(key(&reg, 'w', Context::Detail), Some(Action::VisitSite));
        assert_eq!(key(&reg, 'w', Context::Global), None);
        assert_eq!(key(&reg, 'o', Context::Detail), None);
    }

    #[test]
    fn test_override_multi_bound_action() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("down".to_string(), "J".to_string())]);

        assert!(reg.apply_overrides(&overrides).is_empty());
        assert_eq!(key(&reg, 'J', Context::Global), Some(Action::NavDown));
        assert_eq!(key(&reg, 'j', Context::Global), None);
        assert_eq!(
            reg.action_for_key(KeyCode::Down, KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_apply_overrides_warnings() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([
            ("nonexistent".to_string(), "x".to_string()),
            ("quit".to_string(), "Ctrl+Alt+Q".to_string()),
        ]);

        let mut warnings = reg.apply_overrides(&overrides);
        warnings.sort();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Cannot parse key"));
        assert!(warnings[1].contains("Unknown action"));
        assert_eq!(key(&reg, 'q', Context::Global), Some(Action::Quit));
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::ch(' ')));
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("/"), Some(KeySpec::ch('/')));
        assert_eq!(parse_key_string("é"), Some(KeySpec::ch('é')));
        assert_eq!(parse_key_string("xy"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::ch('q')), "q");
        assert_eq!(format_key(&KeySpec::ch(' ')), "Space");
        assert_eq!(format_key(&KeySpec::ctrl('d')), "Ctrl+d");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_every_action_has_a_default_binding() {
        let reg = KeybindingRegistry::new();
        let bound: std::collections::HashSet<Action> =
            reg.all_bindings().into_iter().map(|(_, _, a, _)| a).collect();
        for name in [
            "quit", "down", "up", "left", "right", "select", "back", "live_tv", "ott", "about",
            "history_back", "history_forward", "notifications", "search", "exit_search",
            "commit_search", "sort_az", "sort_za", "view_list", "view_grid", "visit_site",
            "retry", "theme", "help", "mark_read", "dismiss", "clear_all", "confirm_entry",
        ] {
            let action = parse_action_name(name).unwrap();
            assert!(bound.contains(&action), "{action:?} has no default key");
        }
    }
}
