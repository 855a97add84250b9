//! Dark and light palettes for the directory screens.
//!
//! Widgets never name colours directly; they ask the `StyleMap` for a role
//! (`"nav_active"`, `"partner_selected"`, ...) and get the style of the
//! active `ThemeVariant`.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a stored or configured name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Value written to the `theme` preference.
    pub fn as_pref(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// The theme-toggle target.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for the status bar.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Header / navigation --
    pub brand_name: Style,
    pub brand_tagline: Style,
    pub nav_item: Style,
    pub nav_active: Style,
    pub nav_bell_dot: Style,

    // -- Listing chrome --
    pub page_title: Style,
    pub control_label: Style,
    pub control_active: Style,
    pub search_input: Style,

    // -- Partners --
    pub partner_name: Style,
    pub partner_category: Style,
    pub partner_selected: Style,
    pub partner_link: Style,
    pub card_border: Style,
    pub card_selected: Style,

    // -- Detail / about --
    pub detail_heading: Style,
    pub detail_body: Style,
    pub detail_action: Style,

    // -- Notifications --
    pub notif_alert: Style,
    pub notif_update: Style,
    pub notif_info: Style,
    pub notif_read: Style,
    pub notif_dismissing: Style,

    // -- Messages --
    pub placeholder: Style,
    pub error_message: Style,
    pub gate_title: Style,
    pub gate_body: Style,
    pub gate_button: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            brand_name: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            brand_tagline: Style::default().fg(Color::Gray),
            nav_item: Style::default().fg(Color::Gray),
            nav_active: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            nav_bell_dot: Style::default().fg(Color::Red),

            page_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            control_label: Style::default().fg(Color::DarkGray),
            control_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            search_input: Style::default().fg(Color::White).bg(Color::Black),

            partner_name: Style::default().add_modifier(Modifier::BOLD),
            partner_category: Style::default().fg(Color::Cyan),
            partner_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            partner_link: Style::default().fg(Color::Blue),
            card_border: Style::default().fg(Color::DarkGray),
            card_selected: Style::default().fg(Color::Red),

            detail_heading: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default(),
            detail_action: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED),

            notif_alert: Style::default().fg(Color::Red),
            notif_update: Style::default().fg(Color::Green),
            notif_info: Style::default().fg(Color::Cyan),
            notif_read: Style::default().fg(Color::DarkGray),
            notif_dismissing: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),

            placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            error_message: Style::default().fg(Color::Red),
            gate_title: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            gate_body: Style::default().fg(Color::Gray),
            gate_button: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Red),
        }
    }

    fn light() -> Self {
        Self {
            brand_name: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            brand_tagline: Style::default().fg(Color::DarkGray),
            nav_item: Style::default().fg(Color::Black),
            nav_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            nav_bell_dot: Style::default().fg(Color::Red),

            page_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            control_label: Style::default().fg(Color::DarkGray),
            control_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            search_input: Style::default().fg(Color::Black).bg(Color::Gray),

            partner_name: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            partner_category: Style::default().fg(Color::Blue),
            partner_selected: Style::default().bg(Color::Blue).fg(Color::White),
            partner_link: Style::default().fg(Color::Magenta),
            card_border: Style::default().fg(Color::Gray),
            card_selected: Style::default().fg(Color::Blue),

            detail_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default().fg(Color::Black),
            detail_action: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::UNDERLINED),

            notif_alert: Style::default().fg(Color::Red),
            notif_update: Style::default().fg(Color::Green),
            notif_info: Style::default().fg(Color::Blue),
            notif_read: Style::default().fg(Color::Gray),
            notif_dismissing: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::CROSSED_OUT),

            placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            error_message: Style::default().fg(Color::Red),
            gate_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            gate_body: Style::default().fg(Color::Black),
            gate_button: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// Role-name lookup over a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

const ROLE_NAMES: [&str; 31] = [
    "brand_name",
    "brand_tagline",
    "nav_item",
    "nav_active",
    "nav_bell_dot",
    "page_title",
    "control_label",
    "control_active",
    "search_input",
    "partner_name",
    "partner_category",
    "partner_selected",
    "partner_link",
    "card_border",
    "card_selected",
    "detail_heading",
    "detail_body",
    "detail_action",
    "notif_alert",
    "notif_update",
    "notif_info",
    "notif_read",
    "notif_dismissing",
    "placeholder",
    "error_message",
    "gate_title",
    "gate_body",
    "gate_button",
    "status_bar",
    "panel_border",
    "panel_border_focused",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 31] = [
            p.brand_name,
            p.brand_tagline,
            p.nav_item,
            p.nav_active,
            p.nav_bell_dot,
            p.page_title,
            p.control_label,
            p.control_active,
            p.search_input,
            p.partner_name,
            p.partner_category,
            p.partner_selected,
            p.partner_link,
            p.card_border,
            p.card_selected,
            p.detail_heading,
            p.detail_body,
            p.detail_action,
            p.notif_alert,
            p.notif_update,
            p.notif_info,
            p.notif_read,
            p.notif_dismissing,
            p.placeholder,
            p.error_message,
            p.gate_title,
            p.gate_body,
            p.gate_button,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    pub fn for_variant(variant: ThemeVariant) -> Self {
        Self::from_palette(&variant.palette())
    }

    /// Resolve a role name; unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}
