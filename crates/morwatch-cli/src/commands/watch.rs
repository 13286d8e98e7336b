use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use time::format_description::well_known::Rfc3339;

use morwatch_core::{poller, ApiClient, HealthSnapshot, Settings};

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output::{format_number, CommandOutput};

/// Drive the history poller, printing one line per snapshot until the
/// tick budget runs out or the user interrupts.
pub async fn run(
    args: &WatchArgs,
    client: Arc<ApiClient>,
    settings: &Settings,
) -> Result<CommandOutput, CliError> {
    let interval = Duration::from_millis(args.interval_ms.unwrap_or(settings.poll_interval_ms));
    tracing::debug!(interval_ms = interval.as_millis() as u64, "watch started");
    let handle = poller::spawn(client, interval);

    let mut printed = 0usize;
    loop {
        let snapshots = handle.snapshots();
        for snapshot in snapshots.iter().skip(printed) {
            println!("{}", render_line(snapshot));
        }
        printed = snapshots.len();

        if args.ticks.is_some_and(|limit| printed >= limit) {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(250)) => {}
        }
    }

    handle.cancel();
    let snapshots = handle.snapshots();
    handle.join().await;

    let text = format!("collected {} snapshots", snapshots.len());
    Ok(CommandOutput::new(json!(snapshots), text))
}

fn render_line(snapshot: &HealthSnapshot) -> String {
    let ts = snapshot
        .ts
        .format(&Rfc3339)
        .unwrap_or_else(|_| snapshot.ts.unix_timestamp().to_string());

    if let Some(error) = &snapshot.error {
        return format!("{ts}  error: {error}");
    }

    let status = snapshot
        .health
        .as_ref()
        .and_then(|h| h.status.as_deref())
        .unwrap_or("unknown");
    let mor = snapshot
        .balance
        .as_ref()
        .and_then(|b| b.mor.as_ref())
        .map(|t| t.balance);
    let providers = snapshot.providers.as_ref().map_or(0, Vec::len);

    format!(
        "{ts}  {status}  MOR={}  providers={providers}",
        format_number(mor, 2)
    )
}
