//! Keybinding reference drawn over the current screen.
//!
//! Bindings come from the live registry, so config overrides show up here
//! exactly as they behave.

use crate::app::App;
use crate::keybindings::{Context, KeybindingRegistry};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

/// Sections in the order a visitor meets them.
const SECTIONS: [Context; 6] = [
    Context::Gate,
    Context::Global,
    Context::Listing,
    Context::Search,
    Context::Detail,
    Context::Notifications,
];

/// One line of the reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HelpLine {
    Section(&'static str),
    Binding { key: String, description: &'static str },
    Gap,
}

/// Flatten the registry into sections. Contexts with no bindings are left
/// out, and there is no gap after the last section.
fn help_lines(registry: &KeybindingRegistry) -> Vec<HelpLine> {
    let bindings = registry.all_bindings();
    let mut lines = Vec::new();

    for ctx in SECTIONS {
        let mut section = bindings
            .iter()
            .filter(|(c, _, _, _)| *c == ctx)
            .map(|(_, key, _, description)| HelpLine::Binding {
                key: key.clone(),
                description: *description,
            })
            .peekable();
        if section.peek().is_none() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(HelpLine::Gap);
        }
        lines.push(HelpLine::Section(ctx.label()));
        lines.extend(section);
    }
    lines
}

/// `(first visible line, last valid offset)` for `total` lines in a window
/// of `height`.
fn scroll_window(total: usize, height: usize, requested: usize) -> (usize, usize) {
    let max_offset = total.saturating_sub(height);
    (requested.min(max_offset), max_offset)
}

pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let lines = help_lines(&app.keybindings);
    // Borders plus the column header take three rows
    let height = overlay.height.saturating_sub(3) as usize;
    let (offset, max_offset) = scroll_window(lines.len(), height, app.help_scroll_offset);

    let heading = app.style("detail_heading").add_modifier(Modifier::BOLD);
    let rows: Vec<Row> = lines
        .into_iter()
        .skip(offset)
        .take(height)
        .map(|line| match line {
            HelpLine::Section(label) => Row::new(vec![
                Line::from(Span::styled(label, heading)),
                Line::from(""),
            ]),
            HelpLine::Binding { key, description } => {
                Row::new(vec![format!("  {key}"), description.to_string()])
            }
            HelpLine::Gap => Row::new(vec![String::new(), String::new()]),
        })
        .collect();

    let title = if max_offset > 0 {
        format!(" Keys {}/{} ", offset + 1, max_offset + 1)
    } else {
        " Keys [?] close ".to_string()
    };

    let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(20)])
        .header(
            Row::new(vec!["Key", "Does"])
                .style(Style::default().add_modifier(Modifier::UNDERLINED))
                .bottom_margin(1),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .style(app.style("detail_body"));
    f.render_widget(table, overlay);

    if offset < max_offset {
        let footer = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height.saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        f.render_widget(
            Paragraph::new(Span::styled(" more below: j/k ", app.style("placeholder"))),
            footer,
        );
    }
}

/// `percent_x` by `percent_y` of `area`, centred in it.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
