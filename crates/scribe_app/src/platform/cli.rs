use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

use super::config::FileConfig;

/// Submit a codebase archive for processing and follow its log and graph live.
#[derive(Debug, Parser)]
#[command(name = "scribe", author, version, about, long_about = None)]
pub struct Cli {
    /// ZIP archive of the codebase to upload
    pub archive: PathBuf,

    /// Address the results are e-mailed to
    #[arg(short, long)]
    pub email: Option<String>,

    /// Backend base URL
    #[arg(long)]
    pub server: Option<String>,

    /// Directory for the saved graph and console transcript
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// RON config file (defaults to ./scribe.ron when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log poll interval in milliseconds
    #[arg(long)]
    pub log_interval_ms: Option<u64>,

    /// Graph poll interval in milliseconds
    #[arg(long)]
    pub artifact_interval_ms: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Print log lines as they arrive instead of the interactive console
    #[arg(long)]
    pub plain: bool,

    /// Also write diagnostics to ./scribe.log in plain mode
    #[arg(long)]
    pub log_file: bool,

    /// Increase diagnostic verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Flags expressed as the highest-priority config layer.
    pub fn overrides(&self) -> FileConfig {
        FileConfig {
            server: self.server.clone(),
            output_dir: self.output_dir.clone(),
            log_interval_ms: self.log_interval_ms,
            artifact_interval_ms: self.artifact_interval_ms,
            request_timeout_ms: self.request_timeout_ms,
            ..FileConfig::default()
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "scribe",
            "code.zip",
            "--email",
            "a@b.com",
            "--server",
            "http://10.0.0.2:8000",
            "--log-interval-ms",
            "250",
            "--plain",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.archive, PathBuf::from("code.zip"));
        assert_eq!(cli.email.as_deref(), Some("a@b.com"));
        assert!(cli.plain);
        assert_eq!(cli.log_level(), LevelFilter::Trace);

        let overrides = cli.overrides();
        assert_eq!(overrides.server.as_deref(), Some("http://10.0.0.2:8000"));
        assert_eq!(overrides.log_interval_ms, Some(250));
        assert_eq!(overrides.artifact_interval_ms, None);
    }

    #[test]
    fn archive_is_required() {
        assert!(Cli::try_parse_from(["scribe", "--email", "a@b.com"]).is_err());
    }
}
