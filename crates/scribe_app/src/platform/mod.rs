pub mod app;
pub mod cli;
pub mod config;
pub mod effects;
pub mod logging;
pub mod ui;

use std::fs;
use std::io;
use std::process::ExitCode;

use anyhow::Context;
use console::{style, Term};
use scribe_core::validate_submission;
use scribe_logging::{scribe_info, scribe_warn};

use app::{AppOptions, Outcome};
use cli::Cli;

const EXIT_VALIDATION: u8 = 2;

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let interactive = !cli.plain && Term::stdout().is_term();
    logging::initialize(interactive, cli.log_file, cli.log_level());

    let resolved = config::load_file_config(cli.config.as_deref())?
        .merged_with(cli.overrides())
        .resolve();

    let archive = match fs::read(&cli.archive) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(validation_failed(format!(
                "{} does not exist",
                cli.archive.display()
            )));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", cli.archive.display()))
        }
    };
    let file_name = cli
        .archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let email = cli.email.clone().unwrap_or_default();

    let submission = match validate_submission(&file_name, &archive, &email) {
        Ok(submission) => submission,
        Err(err) => return Ok(validation_failed(err.to_string())),
    };

    scribe_info!(
        "Submitting {} to {} (output in {:?})",
        file_name,
        resolved.engine.base_url,
        resolved.output_dir
    );
    let outcome = app::run_app(
        AppOptions {
            engine: resolved.engine,
            monitor: resolved.monitor,
            output_dir: resolved.output_dir,
            interactive,
        },
        submission,
    )?;
    if outcome == Outcome::Quit {
        scribe_info!("Monitoring stopped by user");
    }
    Ok(outcome.exit_code())
}

fn validation_failed(message: String) -> ExitCode {
    scribe_warn!("Rejected submission: {}", message);
    eprintln!("{} {message}", style("invalid input:").red().bold());
    ExitCode::from(EXIT_VALIDATION)
}
