//! value-invert - A value-inversion plug-in for grid-data dumps

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = value_invert::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
