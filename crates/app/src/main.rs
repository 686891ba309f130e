//! Storefront CLI

use std::process::ExitCode;

use tracing::error;

use storefront_app::{config::ConfigError, context::AppContext, observability};

use crate::cli::Cli;

mod cli;

#[tokio::main]
pub async fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(ConfigError::Parse(error)) => {
            _ = error.print();

            return if error.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging not initialized yet, must use eprintln for config errors"
            )]
            {
                eprintln!("Configuration error: {error}");
            }

            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        #[expect(clippy::print_stderr, reason = "no subscriber to report through")]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    let context = match AppContext::from_config(&cli.config) {
        Ok(context) => context,
        Err(source) => {
            error!(%source, "failed to start");
            return ExitCode::FAILURE;
        }
    };

    match cli.run(&context).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            #[expect(clippy::print_stderr, reason = "command failures are user-facing output")]
            {
                eprintln!("{message}");
            }

            ExitCode::FAILURE
        }
    }
}
