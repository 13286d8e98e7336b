use serde_json::json;

use morwatch_core::{run_setup, start_router, RouterPaths};

use crate::cli::{RouterStartArgs, SetupArgs};
use crate::error::CliError;
use crate::output::CommandOutput;

pub async fn router_start(args: &RouterStartArgs) -> Result<CommandOutput, CliError> {
    let outcome = start_router(&RouterPaths::new(&args.root)).await;
    if !outcome.ok {
        return Err(CliError::Command(outcome.output));
    }
    let text = outcome.output.clone();
    Ok(CommandOutput::new(
        json!({ "ok": true, "message": outcome.output }),
        text,
    ))
}

pub async fn setup(args: &SetupArgs) -> Result<CommandOutput, CliError> {
    let outcome = run_setup(&args.script).await;
    if !outcome.ok {
        return Err(CliError::Command(outcome.output));
    }
    let text = outcome.output.clone();
    Ok(CommandOutput::new(
        json!({ "ok": true, "output": outcome.output }),
        text,
    ))
}
