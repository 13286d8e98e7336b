//! Local process control for the external proxy-router binary.
//!
//! Two opaque operations: start the router binary in the background and
//! run the setup script. Both resolve to a [`ControlOutcome`] value; a
//! missing binary, a dead pid, or a failing script all surface as
//! `ok: false` with the captured output, never as an `Err`.

use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Success flag plus whatever text the operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlOutcome {
    pub ok: bool,
    pub output: String,
}

impl ControlOutcome {
    fn ok(output: impl Into<String>) -> Self {
        Self {
            ok: true,
            output: output.into(),
        }
    }

    fn failed(output: impl Into<String>) -> Self {
        Self {
            ok: false,
            output: output.into(),
        }
    }
}

/// Filesystem layout the router process control works against.
#[derive(Debug, Clone)]
pub struct RouterPaths {
    root: PathBuf,
}

impl RouterPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn binary(&self) -> PathBuf {
        self.root.join("bin").join("proxy-router")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.root.join("logs").join("router.pid")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("logs").join("router.log")
    }
}

/// Start the router binary in the background, guarded by a pid file.
///
/// Already-running routers are reported as success; output goes to the
/// log file under `logs/`.
pub async fn start_router(paths: &RouterPaths) -> ControlOutcome {
    let binary = paths.binary();
    let is_file = tokio::fs::metadata(&binary)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return ControlOutcome::failed("Router binary missing at bin/proxy-router");
    }

    if let Some(pid) = read_pid(&paths.pid_file()).await {
        if is_running(pid).await {
            return ControlOutcome::ok(format!("Router already running (pid {pid})"));
        }
    }

    if let Err(error) = tokio::fs::create_dir_all(paths.root.join("logs")).await {
        return ControlOutcome::failed(format!("Failed to create log directory: {error}"));
    }

    // Detach via the shell so the router outlives this process; the child
    // echoes its own pid back.
    let command = format!(
        "cd {root} && {binary} >> {log} 2>&1 & echo $!",
        root = shell_quote(&paths.root),
        binary = shell_quote(&binary),
        log = shell_quote(&paths.log_file()),
    );
    let output = match Command::new("bash").arg("-lc").arg(&command).output().await {
        Ok(output) => output,
        Err(error) => return ControlOutcome::failed(format!("Failed to start router: {error}")),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.trim().parse::<u32>() {
        Ok(pid) if pid > 0 => {
            // Best effort; a missing pid file only weakens the next guard.
            let _ = tokio::fs::write(paths.pid_file(), format!("{pid}\n")).await;
            ControlOutcome::ok(format!("Router started (pid {pid})"))
        }
        _ => ControlOutcome::failed("Router start command returned no pid"),
    }
}

/// Run the setup script and capture its combined output.
pub async fn run_setup(script: &Path) -> ControlOutcome {
    let output = match Command::new("bash").arg(script).output().await {
        Ok(output) => output,
        Err(error) => return ControlOutcome::failed(format!("Failed to run setup: {error}")),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined = [stdout.trim(), stderr.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    if output.status.success() {
        ControlOutcome::ok(combined)
    } else {
        ControlOutcome::failed(combined)
    }
}

async fn read_pid(pid_file: &Path) -> Option<u32> {
    let content = tokio::fs::read_to_string(pid_file).await.ok()?;
    content.trim().parse::<u32>().ok().filter(|pid| *pid > 0)
}

/// Signal 0 probes liveness without touching the process.
async fn is_running(pid: u32) -> bool {
    Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "'\\''"))
}
