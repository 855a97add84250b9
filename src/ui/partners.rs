//! Partner listing widget: controls row plus the list or grid body.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState as WidgetListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::listing::{SortMethod, ViewMode};
use crate::util::truncate_to_width;
use crate::view::{ListingBody, ListingView, PartnerCard, PartnerRow, SEARCH_PLACEHOLDER};

const CARD_WIDTH: u16 = 24;
const CARD_HEIGHT: u16 = 4;

pub fn render(f: &mut Frame, app: &mut App, view: &ListingView, area: Rect, base: Style) {
    if area.width < 1 || area.height < 3 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    render_controls(f, app, view, chunks[0]);

    match &view.body {
        ListingBody::Rows(rows) => render_rows(f, app, rows, view.selected, chunks[1], base),
        ListingBody::Cards(cards) => {
            render_cards(f, app, cards, view.selected, chunks[1], base);
        }
        ListingBody::Empty(message) => {
            let paragraph = Paragraph::new(*message).style(base.patch(app.style("placeholder")));
            f.render_widget(paragraph, chunks[1]);
        }
    }
}

fn render_controls(f: &mut Frame, app: &App, view: &ListingView, area: Rect) {
    let search_text = if app.search_mode {
        format!("{}_", app.search_input)
    } else if view.search_term.is_empty() {
        SEARCH_PLACEHOLDER.to_string()
    } else {
        view.search_term.clone()
    };
    let search_role = if app.search_mode || !view.search_term.is_empty() {
        "search_input"
    } else {
        "placeholder"
    };

    let toggle = |label: &'static str, active: bool| {
        let role = if active { "control_active" } else { "control_label" };
        Span::styled(format!(" {label} "), app.style(role))
    };

    let title = Line::from(vec![
        Span::styled(view.title, app.style("page_title")),
        Span::styled(format!("  ({})", view.len()), app.style("control_label")),
    ]);

    let controls = Line::from(vec![
        Span::styled("[/] ", app.style("control_label")),
        Span::styled(
            truncate_to_width(&search_text, 40).into_owned(),
            app.style(search_role),
        ),
        Span::styled("   [a/z] ", app.style("control_label")),
        toggle(SortMethod::Az.label(), view.sort == SortMethod::Az),
        toggle(SortMethod::Za.label(), view.sort == SortMethod::Za),
        Span::styled("   [L/G] ", app.style("control_label")),
        toggle("List", view.view_mode == ViewMode::List),
        toggle("Grid", view.view_mode == ViewMode::Grid),
    ]);

    f.render_widget(Paragraph::new(vec![title, controls]), area);
}

fn render_rows(
    f: &mut Frame,
    app: &mut App,
    rows: &[PartnerRow],
    selected: usize,
    area: Rect,
    base: Style,
) {
    app.grid_columns = 1;
    let name_width = (area.width as usize).saturating_sub(24).max(8);

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<width$}", truncate_to_width(&row.name, name_width), width = name_width),
                    app.style("partner_name"),
                ),
                Span::styled(
                    format!("  {}", truncate_to_width(&row.category, 20)),
                    app.style("partner_category"),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(app.style("panel_border")),
        )
        .style(base)
        .highlight_style(app.style("partner_selected"))
        .highlight_symbol("> ");

    let mut state = WidgetListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_cards(
    f: &mut Frame,
    app: &mut App,
    cards: &[PartnerCard],
    selected: usize,
    area: Rect,
    base: Style,
) {
    let columns = (area.width / CARD_WIDTH).max(1) as usize;
    app.grid_columns = columns;

    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = selected / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    for (index, card) in cards.iter().enumerate().skip(first_row * columns) {
        let row = index / columns - first_row;
        if row >= visible_rows {
            break;
        }
        let col = index % columns;
        let cell = Rect {
            x: area.x + col as u16 * CARD_WIDTH,
            y: area.y + row as u16 * CARD_HEIGHT,
            width: CARD_WIDTH.min(area.width),
            height: CARD_HEIGHT,
        };
        if cell.y + cell.height > area.y + area.height {
            break;
        }

        let is_selected = index == selected;
        let border = if is_selected { "card_selected" } else { "card_border" };
        let mut name_style = app.style("partner_name");
        if is_selected {
            name_style = name_style.add_modifier(Modifier::BOLD);
        }

        let inner = CARD_WIDTH.saturating_sub(2) as usize;
        let logo = if card.logo.is_empty() {
            String::new()
        } else {
            truncate_to_width(&card.logo, inner).into_owned()
        };
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(truncate_to_width(&card.name, inner).into_owned(), name_style)),
            Line::from(Span::styled(logo, app.style("partner_link"))),
        ])
        .style(base)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style(border)),
        );
        f.render_widget(paragraph, cell);
    }
}
