use std::ops::Range;

use scribe_core::Msg;

use super::constants::{FOOTER_ROWS, HEADER_ROWS, ROW_HEIGHT_PX};

/// Vertical layout of the log window: how many rows fit and which row is at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleLayout {
    viewport_rows: usize,
    offset: usize,
}

impl ConsoleLayout {
    pub fn new(terminal_rows: u16) -> Self {
        Self {
            viewport_rows: viewport_for(terminal_rows),
            offset: 0,
        }
    }

    pub fn resize(&mut self, terminal_rows: u16, content_rows: usize) {
        self.viewport_rows = viewport_for(terminal_rows);
        self.offset = self.offset.min(self.max_offset(content_rows));
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    pub fn scroll_by(&mut self, delta: isize, content_rows: usize) {
        let target = self.offset.saturating_add_signed(delta);
        self.offset = target.min(self.max_offset(content_rows));
    }

    pub fn page(&mut self, down: bool, content_rows: usize) {
        let rows = self.viewport_rows as isize;
        self.scroll_by(if down { rows } else { -rows }, content_rows);
    }

    pub fn scroll_to_bottom(&mut self, content_rows: usize) {
        self.offset = self.max_offset(content_rows);
    }

    /// Rows of the log currently inside the window.
    pub fn visible(&self, content_rows: usize) -> Range<usize> {
        let start = self.offset.min(content_rows);
        start..(start + self.viewport_rows).min(content_rows)
    }

    /// The scroll position expressed in pixels, as the core's scroll tracker expects.
    /// Content never measures shorter than the window it sits in.
    pub fn scroll_msg(&self, content_rows: usize) -> Msg {
        Msg::ConsoleScrolled {
            viewport_height: self.viewport_rows as f64 * ROW_HEIGHT_PX,
            content_height: content_rows.max(self.viewport_rows) as f64 * ROW_HEIGHT_PX,
            scroll_offset: self.offset as f64 * ROW_HEIGHT_PX,
        }
    }

    fn max_offset(&self, content_rows: usize) -> usize {
        content_rows.saturating_sub(self.viewport_rows)
    }
}

fn viewport_for(terminal_rows: u16) -> usize {
    (terminal_rows as usize)
        .saturating_sub(HEADER_ROWS + FOOTER_ROWS)
        .max(1)
}
