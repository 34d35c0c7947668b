//! vidfetch - download videos, playlists and batches of videos through yt-dlp

use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use vidfetch::app::{self, RunOutcome};
use vidfetch::cli::Args;
use vidfetch::utils::{self, AppSettings};

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(mode) = args.mode() else {
        let _ = Args::command().print_help();
        return ExitCode::from(app::EXIT_USAGE);
    };

    let settings = match AppSettings::load(args.config.as_deref()) {
        Ok(loaded) => args.apply_to(loaded),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(app::EXIT_CONFIG);
        }
    };

    // Held until exit so buffered log lines reach the file
    let _log_guard = utils::init_tracing(&settings.log_file, args.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = rt.block_on(app::run(&args, mode, &settings));
    if let RunOutcome::Interrupted = outcome {
        tracing::debug!("Exiting after interrupt");
    }

    ExitCode::from(app::exit_status(&outcome))
}
