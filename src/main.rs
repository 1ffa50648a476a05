mod api;
mod app;
mod application;
mod cli;
mod config;
mod domain;
mod logging;
mod utils;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::{error, info};

use crate::cli::Cli;
use crate::config::{CatcherSettings, SettingsError};

fn main() -> ExitCode {
    logging::init_logging();
    info!(
        "{} (Version: {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let args = cli::normalize_single_dash_flags(std::env::args_os());
    if args.len() <= 1 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let download_path = match cli.download_path.map_or_else(config::default_download_path, Ok) {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let settings = match CatcherSettings::resolve(&download_path, &cli.feed_url) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            if matches!(e, SettingsError::MissingFeedUrl) {
                print_usage();
            }
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Unable to start the async runtime. Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(app::run(&settings));

    // the blocking stdin read cannot be cancelled, so don't wait for it
    runtime.shutdown_background();
    code
}

fn print_usage() {
    let _ = Cli::command().print_help();
}
