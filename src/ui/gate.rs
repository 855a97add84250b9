use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::view::gate_view;

/// Welcome screen shown on the first visit, above everything else.
pub fn render(f: &mut Frame, app: &App) {
    let Some(bundle) = &app.bundle else {
        return;
    };
    let gate = gate_view(&bundle.entry_screen);

    let area = f.area();
    let width = 60u16.min(area.width.saturating_sub(4));
    let height = 10u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(gate.title, app.style("gate_title"))),
        Line::from(""),
        Line::from(Span::styled(gate.info, app.style("gate_body"))),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} [Enter] ", gate.button_text),
            app.style("gate_button"),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused")),
    );
    f.render_widget(paragraph, overlay);
}
