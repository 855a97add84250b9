use std::borrow::Cow;

use ratatui::{layout::Rect, widgets::Paragraph, Frame};

use crate::app::{App, Phase};
use crate::notifications::StreamStatus;
use crate::view::ContentView;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Borrow static hints; only the status message and reconnect notice own text
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if let Some(StreamStatus::Reconnecting(delay)) = &app.stream_status {
        Cow::Owned(format!(
            "Notifications offline, retrying in {}s | [?]help [q]uit",
            delay.as_secs()
        ))
    } else if app.phase != Phase::Running {
        match &app.worker {
            Some(worker) => Cow::Owned(format!("Offline cache {} | [?]help [q]uit", worker.state())),
            None => Cow::Borrowed("[?]help [q]uit"),
        }
    } else if app.search_mode {
        Cow::Borrowed("Type to filter | ESC cancel | ENTER keep")
    } else if app.notifications.is_open() {
        Cow::Borrowed("[j/k]select [m]ark read [d]ismiss [c]lear all [Esc]close")
    } else {
        match &app.content {
            ContentView::Listing(_) => Cow::Borrowed(
                "[Enter]open [/]search [a/z]sort [L/G]layout [1-3]pages [n]otifications [?]help [q]uit",
            ),
            ContentView::Detail(_) => {
                Cow::Borrowed("[b]ack [o]pen site [[/]]history [n]otifications [?]help [q]uit")
            }
            ContentView::PartialError(_) => Cow::Borrowed("[r]etry [1-3]pages [?]help [q]uit"),
            _ => Cow::Borrowed("[1-3]pages [[/]]history [n]otifications [?]help [q]uit"),
        }
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
