use clap::Parser;
use noisy_sphere::{run, Cli, DemoConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let config = DemoConfig::from(Cli::parse());
    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
