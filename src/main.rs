//! Crease - ball-by-ball cricket scoring from the command line

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = crease_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
