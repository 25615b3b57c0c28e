/// Distance from the bottom edge, in pixels, still treated as "at the bottom".
pub const PIN_THRESHOLD_PX: f64 = 10.0;

/// What the console view should do after a tracker decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    ScrollToBottom,
    Stay,
}

/// Tracks whether the log console follows new output.
///
/// The tracker only stores the pinned flag; scrolling itself is done by the view
/// in response to [`ScrollCommand::ScrollToBottom`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTracker {
    pinned: bool,
    threshold: f64,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self {
            pinned: true,
            threshold: PIN_THRESHOLD_PX,
        }
    }
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Record a user scroll. Extents are in pixels.
    pub fn on_scroll(&mut self, viewport_height: f64, content_height: f64, scroll_offset: f64) {
        let distance = (content_height - viewport_height - scroll_offset).abs();
        self.pinned = distance < self.threshold;
    }

    /// New lines arrived; follow them only when pinned.
    pub fn on_content_grew(&self) -> ScrollCommand {
        if self.pinned {
            ScrollCommand::ScrollToBottom
        } else {
            ScrollCommand::Stay
        }
    }

    /// Explicit "scroll to bottom" request; overrides any manual position.
    pub fn force_pin(&mut self) -> ScrollCommand {
        self.pinned = true;
        ScrollCommand::ScrollToBottom
    }
}
