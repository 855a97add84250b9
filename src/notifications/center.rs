use std::collections::HashSet;

use crate::content::NotificationRecord;

/// Rendered when the list is empty.
pub const EMPTY_NOTIFICATIONS_MESSAGE: &str = "No new notifications.";

/// Local notification state: the current list, records mid-dismissal, and
/// the overlay.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    records: Vec<NotificationRecord>,
    /// Ids playing the exit animation; removed when it ends
    dismissing: HashSet<String>,
    overlay_open: bool,
    selected: usize,
}

impl NotificationCenter {
    pub fn new(initial: Vec<NotificationRecord>) -> Self {
        Self {
            records: initial,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drives the bell dot.
    pub fn has_unread(&self) -> bool {
        self.records.iter().any(|n| !n.is_read)
    }

    pub fn unread_count(&self) -> usize {
        self.records.iter().filter(|n| !n.is_read).count()
    }

    pub fn is_dismissing(&self, id: &str) -> bool {
        self.dismissing.contains(id)
    }

    /// Replace the whole list with a pushed one.
    ///
    /// Returns `false` and leaves everything untouched when the new list is
    /// structurally identical. On change the overlay opens to draw attention.
    pub fn replace_if_changed(&mut self, records: Vec<NotificationRecord>) -> bool {
        if records == self.records {
            return false;
        }
        self.records = records;
        let ids: HashSet<&str> = self.records.iter().map(|n| n.id.as_str()).collect();
        self.dismissing.retain(|id| ids.contains(id.as_str()));
        self.clamp_selection();
        self.overlay_open = true;
        true
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.records.iter_mut().find(|n| n.id == id) {
            Some(record) if !record.is_read => {
                record.is_read = true;
                true
            }
            _ => false,
        }
    }

    /// Start the exit animation. Returns `true` when the caller should
    /// schedule the animation-end signal.
    pub fn begin_dismiss(&mut self, id: &str) -> bool {
        if !self.records.iter().any(|n| n.id == id) {
            return false;
        }
        self.dismissing.insert(id.to_string())
    }

    /// Animation ended: drop the record if it is still there.
    pub fn finish_dismiss(&mut self, id: &str) -> bool {
        self.dismissing.remove(id);
        let Some(index) = self.records.iter().position(|n| n.id == id) else {
            return false;
        };
        self.records.remove(index);
        self.clamp_selection();
        true
    }

    pub fn clear_all(&mut self) {
        self.records.clear();
        self.dismissing.clear();
        self.selected = 0;
    }

    // ========================================================================
    // Overlay
    // ========================================================================

    pub fn is_open(&self) -> bool {
        self.overlay_open
    }

    pub fn open(&mut self) {
        self.overlay_open = true;
    }

    pub fn close(&mut self) {
        self.overlay_open = false;
    }

    pub fn toggle(&mut self) {
        self.overlay_open = !self.overlay_open;
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&NotificationRecord> {
        self.records.get(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.selected = self.selected.saturating_add_signed(delta);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.records.len().saturating_sub(1));
    }
}
