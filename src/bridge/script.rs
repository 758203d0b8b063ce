use crate::bridge::workspace::Workspace;
use crate::bridge::{BridgeConfig, BridgeError};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

/// Captured result of one script run.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Build the script command: `<interpreter> <script> <input> <markdown> <spreadsheet>`.
///
/// Every path is a separate argument; nothing goes through a shell.
pub fn build_command(config: &BridgeConfig, workspace: &Workspace, input: &Path) -> Command {
    let mut command = Command::new(&config.interpreter);
    command
        .arg(&config.script)
        .arg(input)
        .arg(workspace.markdown_path())
        .arg(workspace.spreadsheet_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

/// Run the script and wait for it, bounded by `config.timeout`.
///
/// On timeout the child is dropped, which kills it.
pub async fn run(
    config: &BridgeConfig,
    workspace: &Workspace,
    input: &Path,
) -> Result<ScriptOutput, BridgeError> {
    let mut command = build_command(config, workspace, input);
    info!(
        request_id = %workspace.request_id(),
        interpreter = %config.interpreter,
        script = %config.script.display(),
        "running extraction script"
    );

    let child = command.spawn().map_err(|source| BridgeError::Launch {
        interpreter: config.interpreter.clone(),
        source,
    })?;

    let output = match timeout(config.timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| BridgeError::Io {
            action: "wait for extraction script",
            source,
        })?,
        Err(_) => return Err(BridgeError::Timeout(config.timeout)),
    };

    let output = ScriptOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(
        request_id = %workspace.request_id(),
        exit_code = ?output.exit_code,
        "extraction script finished"
    );
    Ok(output)
}
