use std::process::ExitCode;

use clap::Parser;
use corsserve::cli::Cli;
use corsserve::{logger, Config, ServeError};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_startup_failure(&e);
            if e.is_bind_error() {
                logger::log_warning("Is another server already running on this port?");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), ServeError> {
    let cfg = Config::load(cli)?;
    logger::init(&cfg).map_err(ServeError::Logger)?;

    // One thread: connections are served strictly one after another
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ServeError::Runtime)?;

    runtime.block_on(corsserve::start(&cfg))
}
