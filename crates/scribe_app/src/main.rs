mod platform;

use std::process::ExitCode;

use clap::Parser;

use platform::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match platform::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", console::style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
