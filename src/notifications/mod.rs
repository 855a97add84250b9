//! Notification channel: the local list with read/dismiss/clear, and the
//! server-sent-events stream that replaces it.

mod center;
mod stream;

pub use center::{NotificationCenter, EMPTY_NOTIFICATIONS_MESSAGE};
pub use stream::{
    parse_notification_message, run_notification_stream, SseEvent, SseParser, StreamEvent,
    StreamStatus, DEFAULT_RETRY,
};

use std::time::Duration;

/// Length of the dismiss exit animation.
pub const DISMISS_ANIMATION: Duration = Duration::from_millis(300);
