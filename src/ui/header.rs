use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::util::truncate_to_width;

/// Render the header: brand, navigation, bell and theme indicator.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let header = app.header();
    let mut spans: Vec<Span> = Vec::new();

    if let Some((name, tagline)) = &header.brand {
        spans.push(Span::styled(name.clone(), app.style("brand_name")));
        if !tagline.is_empty() {
            let max = (area.width as usize / 3).max(8);
            spans.push(Span::styled(
                format!(" {}", truncate_to_width(tagline, max)),
                app.style("brand_tagline"),
            ));
        }
        spans.push(Span::raw("   "));
    }

    for (i, item) in header.nav.iter().enumerate() {
        let role = if item.active { "nav_active" } else { "nav_item" };
        spans.push(Span::styled(format!(" {} {} ", i + 1, item.label), app.style(role)));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled(" [n] Notifications", app.style("nav_item")));
    if header.bell_dot {
        spans.push(Span::styled(" ●", app.style("nav_bell_dot")));
    }
    spans.push(Span::styled(
        format!("   [t] {}", header.theme_name),
        app.style("control_label"),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(app.style("panel_border")),
    );
    f.render_widget(paragraph, area);
}
