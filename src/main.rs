use std::process::ExitCode;

use ada_validgen::cli;
use colored::Colorize;

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.init_logging();
    match command_line_interface.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}: {error:#}", "error".bright_red());
            ExitCode::FAILURE
        }
    }
}
