//! bottle - messages to your future self

use std::process::ExitCode;

fn main() -> ExitCode {
    match bottle_cli::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        // The user backed out of a prompt; leave without noise
        Err(e) if bottle_cli::cli::is_interrupted(&e) => ExitCode::from(130),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
