//! Render dispatch for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Phase};
use crate::view::ContentView;

use super::{gate, header, help, notifications, pages, partners, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.phase {
        Phase::LoadingBundle => pages::render_loading(f, app, chunks[0]),
        Phase::Fatal(message) => pages::render_fatal(f, app, message, chunks[0]),
        Phase::Gate => gate::render(f, app),
        Phase::Running => {
            render_main(f, app, chunks[0]);
            if app.notifications.is_open() {
                notifications::render(f, app);
            }
        }
    }
    status::render(f, app, chunks[1]);

    if app.show_help {
        help::render(f, app);
    }
}

/// Header on top, content region below.
fn render_main(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    header::render(f, app, chunks[0]);

    let content_area = Rect {
        x: chunks[1].x + 1,
        width: chunks[1].width.saturating_sub(2),
        ..chunks[1]
    };

    // Content dims while it fades in after a navigation
    let base = if app.is_fading() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };

    let content = app.content.clone();
    match &content {
        ContentView::Loading => pages::render_loading(f, app, content_area),
        ContentView::Listing(view) => partners::render(f, app, view, content_area, base),
        ContentView::Detail(detail) => pages::render_detail(f, app, detail, content_area, base),
        ContentView::About(about) => pages::render_about(f, app, about, content_area, base),
        ContentView::NotFound(message) | ContentView::PartialError(message) => {
            pages::render_message(f, app, message, content_area, base)
        }
    }
}
