use std::sync::Arc;

use morwatch_core::{ApiClient, Settings};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::CommandOutput;

mod control;
mod status;
mod telemetry;
mod watch;

pub async fn run(cli: &Cli, settings: &Settings) -> Result<CommandOutput, CliError> {
    let client = build_client(cli, settings);
    match &cli.command {
        Command::Status(args) => status::run(args, &client, settings).await,
        Command::Health => telemetry::health(&client).await,
        Command::Balance => telemetry::balance(&client).await,
        Command::Providers => telemetry::providers(&client).await,
        Command::Models => telemetry::models(&client).await,
        Command::Bids(args) => telemetry::bids(args, &client).await,
        Command::Config(args) => telemetry::config(args, &client).await,
        Command::Watch(args) => watch::run(args, client, settings).await,
        Command::RouterStart(args) => control::router_start(args).await,
        Command::Setup(args) => control::setup(args).await,
    }
}

fn build_client(cli: &Cli, settings: &Settings) -> Arc<ApiClient> {
    let mut client = ApiClient::new(settings);
    if let Some(timeout_ms) = cli.timeout_ms {
        client = client.with_timeout_ms(timeout_ms);
    }
    Arc::new(client)
}
