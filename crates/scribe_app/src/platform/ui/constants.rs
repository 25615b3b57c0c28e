use std::time::Duration;

/// Height of one console row when translating row offsets into scroll positions.
pub const ROW_HEIGHT_PX: f64 = 16.0;

/// Rows above the log window: title and status line.
pub const HEADER_ROWS: usize = 2;
/// Rows below the log window: key help.
pub const FOOTER_ROWS: usize = 1;

/// Redraws are coalesced to at most one per tick.
pub const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub const KEY_HELP: &str = "↑/↓ scroll  PgUp/PgDn page  End/b bottom  c console  q quit";
