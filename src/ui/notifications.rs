//! Notification overlay, anchored under the header on the right.

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState as WidgetListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::content::NotificationKind;
use crate::view::{notifications_view, NotificationsView};

fn kind_role(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Alert => "notif_alert",
        NotificationKind::Update => "notif_update",
        NotificationKind::Info => "notif_info",
    }
}

fn kind_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Alert => "ALERT",
        NotificationKind::Update => "UPDATE",
        NotificationKind::Info => "INFO",
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    let width = 50u16.min(area.width.saturating_sub(2));
    let height = 16u16.min(area.height.saturating_sub(4));
    let overlay = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + 3,
        width,
        height,
    );
    if overlay.width < 20 || overlay.height < 4 {
        return;
    }

    f.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(" Notifications ")
        .title_bottom(" [m]read [d]ismiss [c]lear all [Esc] ");

    match notifications_view(&app.notifications) {
        NotificationsView::Empty(message) => {
            let paragraph = Paragraph::new(message)
                .style(app.style("placeholder"))
                .block(block);
            f.render_widget(paragraph, overlay);
        }
        NotificationsView::Entries { entries, selected } => {
            let items: Vec<ListItem> = entries
                .iter()
                .map(|entry| {
                    let title_role = if entry.dismissing {
                        "notif_dismissing"
                    } else if entry.unread {
                        kind_role(entry.kind)
                    } else {
                        "notif_read"
                    };
                    let mut title_style = app.style(title_role);
                    if entry.unread && !entry.dismissing {
                        title_style = title_style.add_modifier(Modifier::BOLD);
                    }

                    let mut header = vec![
                        Span::styled(format!("[{}] ", kind_label(entry.kind)), app.style(kind_role(entry.kind))),
                        Span::styled(entry.title.clone(), title_style),
                    ];
                    if entry.can_mark_read {
                        header.push(Span::styled("  (m)", app.style("control_label")));
                    }

                    let body_role = if entry.dismissing { "notif_dismissing" } else { "detail_body" };
                    ListItem::new(vec![
                        Line::from(header),
                        Line::from(Span::styled(format!("  {}", entry.message), app.style(body_role))),
                    ])
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(app.style("partner_selected"));
            let mut state = WidgetListState::default().with_selected(Some(selected));
            f.render_stateful_widget(list, overlay, &mut state);
        }
    }
}
