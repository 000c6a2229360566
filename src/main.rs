//! amalgam - Single-header merge for libuvcxx

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = amalgam_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
