//! Board API harness: one-shot commands and an interactive shell.

mod cli;
mod commands;
mod render;
mod shell;

use std::process::ExitCode;

use clap::Parser;
use client::ApiClient;
use common::{AppError, HarnessConfig};
use domain::{CurrentUser, Session};
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::commands::Harness;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config_from(&cli);
    debug!(?config, "Loaded configuration");

    let api = match ApiClient::new(&config) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("{}", render::error(&err));
            return ExitCode::FAILURE;
        }
    };
    let harness = Harness::new(&api, api.endpoints().clone())
        .page_limit(config.default_page_limit)
        .skip_checks(cli.skip_checks);
    let mut session = initial_session(&cli);

    let result = match cli.command {
        Command::Shell => {
            info!(backend = %config.backend_url, "Starting shell");
            let input = BufReader::new(tokio::io::stdin());
            shell::run(&harness, &mut session, input, &mut std::io::stdout())
                .await
                .map(|_| None)
        }
        command => harness.run(command, &mut session).await.map(Some),
    };

    match result {
        Ok(Some(output)) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render::error(&err));
            exit_code(&err)
        }
    }
}

/// 2 when nothing was sent (bad input or no session), 1 when the call failed.
fn exit_code(err: &AppError) -> ExitCode {
    if err.is_local() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

/// Environment configuration with command-line overrides applied.
fn config_from(cli: &Cli) -> HarnessConfig {
    let mut config = HarnessConfig::from_env();
    if let Some(url) = &cli.backend_url {
        config.backend_url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = &cli.model_url {
        config.model_api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = cli.timeout.filter(|secs| *secs > 0) {
        config.request_timeout_secs = secs;
    }
    config
}

/// Session for `--user-id`, anonymous otherwise.
fn initial_session(cli: &Cli) -> Session {
    match cli.user_id {
        Some(user_id) => Session::for_user(CurrentUser {
            user_id,
            nickname: cli
                .nickname
                .clone()
                .unwrap_or_else(|| format!("user{user_id}")),
            profile_image_url: None,
        }),
        None => Session::anonymous(),
    }
}
