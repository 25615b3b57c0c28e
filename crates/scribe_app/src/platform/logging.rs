//! Picks where diagnostics go for the current run.
//!
//! The interactive console owns the terminal, so it only ever logs to
//! `./scribe.log`. Plain mode logs to the terminal, plus the file with `--log-file`.

use std::path::PathBuf;

use log::LevelFilter;
use scribe_logging::{LogDestination, DEFAULT_LOG_FILE};

pub fn destination(interactive: bool, log_file: bool) -> LogDestination {
    match (interactive, log_file) {
        (true, _) => LogDestination::default_file(),
        (false, true) => LogDestination::Both(PathBuf::from(DEFAULT_LOG_FILE)),
        (false, false) => LogDestination::Terminal,
    }
}

pub fn initialize(interactive: bool, log_file: bool, level: LevelFilter) {
    scribe_logging::initialize(destination(interactive, log_file), level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactive_mode_never_logs_to_terminal() {
        assert_eq!(destination(true, false), LogDestination::default_file());
        assert_eq!(destination(true, true), LogDestination::default_file());
    }

    #[test]
    fn plain_mode_logs_to_terminal() {
        assert_eq!(destination(false, false), LogDestination::Terminal);
        assert_eq!(
            destination(false, true),
            LogDestination::Both(PathBuf::from("scribe.log"))
        );
    }
}
