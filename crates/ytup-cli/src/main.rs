use ytup_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // File logging if the state dir is usable, stderr otherwise.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("ytup error: {:#}", err);
        std::process::exit(1);
    }
}
