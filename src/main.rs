//! Filed Recipes - console recipe book

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = filed_recipes::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
