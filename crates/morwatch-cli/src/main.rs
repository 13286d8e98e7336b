mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use morwatch_core::{sanitize_base_url, Settings};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    let result = commands::run(&cli, &settings).await?;
    output::render(&result, cli.format, cli.pretty)?;

    Ok(ExitCode::SUCCESS)
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = match &cli.settings {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|error| CliError::Settings(format!("{}: {error}", path.display())))?;
            serde_json::from_str(&content)
                .map_err(|error| CliError::Settings(format!("{}: {error}", path.display())))?
        }
        None => Settings::from_env(),
    };

    if let Some(base_url) = &cli.base_url {
        settings.base_url = sanitize_base_url(base_url);
    }

    Ok(settings)
}
