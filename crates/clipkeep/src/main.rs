use std::process::ExitCode;

use clap::Parser;

use crate::cli::app::App;

mod cli;
mod config;
mod utils;

fn main() -> ExitCode {
    let app = App::parse();
    utils::logging::init(app.verbose);

    match app.run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
