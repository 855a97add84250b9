//! Static content pages: partner detail, About, and message screens.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::view::{AboutView, DetailView, MessageView};

pub fn render_detail(f: &mut Frame, app: &App, detail: &DetailView, area: Rect, base: Style) {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("< {} [b]", detail.back_label),
            app.style("detail_action"),
        )),
        Line::from(""),
        Line::from(Span::styled(detail.name.clone(), app.style("detail_heading"))),
    ];
    if !detail.category.is_empty() {
        lines.push(Line::from(Span::styled(
            detail.category.clone(),
            app.style("partner_category"),
        )));
    }
    lines.push(Line::from(""));
    if !detail.description.is_empty() {
        lines.push(Line::from(Span::styled(
            detail.description.clone(),
            app.style("detail_body"),
        )));
        lines.push(Line::from(""));
    }
    if !detail.logo.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Logo: ", app.style("control_label")),
            Span::styled(detail.logo.clone(), app.style("partner_link")),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled(format!("[o] {}: ", detail.visit_label), app.style("detail_action")),
        Span::styled(detail.link.clone(), app.style("partner_link")),
    ]));

    let paragraph = Paragraph::new(lines)
        .style(base)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

pub fn render_about(f: &mut Frame, app: &App, about: &AboutView, area: Rect, base: Style) {
    let mut lines = vec![
        Line::from(Span::styled(about.title.clone(), app.style("page_title"))),
        Line::from(""),
    ];

    for section in &about.sections {
        lines.push(Line::from(Span::styled(
            section.heading.clone(),
            app.style("detail_heading"),
        )));
        lines.push(Line::from(Span::styled(section.text.clone(), app.style("detail_body"))));
        lines.push(Line::from(""));
    }

    for (label, address) in &about.contacts {
        lines.push(Line::from(vec![
            Span::styled(format!("{label}: "), app.style("control_label")),
            Span::styled(address.clone(), app.style("partner_link")),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .style(base)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

pub fn render_message(f: &mut Frame, app: &App, message: &MessageView, area: Rect, base: Style) {
    let mut lines = vec![Line::from(Span::styled(message.title, app.style("page_title")))];
    if let Some(text) = message.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(text, app.style("error_message"))));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("[r] Retry", app.style("detail_action"))));
    }

    let paragraph = Paragraph::new(lines)
        .style(base)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

pub fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new("Loading...")
        .style(app.style("placeholder"))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

/// Whole-screen error when the core content could not be loaded.
pub fn render_fatal(f: &mut Frame, app: &App, message: &str, area: Rect) {
    let y = area.y + area.height / 2;
    let line_area = Rect::new(area.x, y.saturating_sub(1), area.width, 3.min(area.height));
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(message.to_string(), app.style("error_message"))),
        Line::from(""),
        Line::from(Span::styled("[r] Retry   [q] Quit", app.style("control_label"))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(paragraph, line_area);
}
