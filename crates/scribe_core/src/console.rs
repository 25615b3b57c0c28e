//! Incremental rendering bookkeeping for the log console.
//!
//! Log polls deliver full snapshots. The console remembers how much of the
//! previous snapshot it already drew so a view can append only the new tail.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleUpdate {
    /// Nothing new since the last sync.
    Unchanged,
    /// Lines `from..` are new and should be appended.
    Append { from: usize },
    /// The snapshot does not extend what was drawn; redraw everything.
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConsole {
    rendered: usize,
    last_line: Option<String>,
}

impl LogConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered_len(&self) -> usize {
        self.rendered
    }

    pub fn reset(&mut self) {
        self.rendered = 0;
        self.last_line = None;
    }

    /// Compare `logs` against what has been drawn and record it as drawn.
    pub fn sync(&mut self, logs: &[String]) -> ConsoleUpdate {
        let extends_previous = logs.len() >= self.rendered
            && match (&self.last_line, self.rendered.checked_sub(1)) {
                (Some(last), Some(idx)) => logs.get(idx) == Some(last),
                _ => true,
            };

        let update = if !extends_previous {
            ConsoleUpdate::Reset
        } else if logs.len() == self.rendered {
            ConsoleUpdate::Unchanged
        } else {
            ConsoleUpdate::Append {
                from: self.rendered,
            }
        };

        self.rendered = logs.len();
        self.last_line = logs.last().cloned();
        update
    }
}
