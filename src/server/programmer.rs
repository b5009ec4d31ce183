//! Programmer tool invocation
// (c) 2025 Ross Younger

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error};

use super::ServerOptions;
use crate::protocol::ProgrammingResult;

/// Runs the programmer tool against a materialized bitstream, capturing its
/// output. Every outcome, including failure to launch and timeout, becomes a
/// [`ProgrammingResult`]; the connection handler never sees an error from
/// here.
pub(crate) async fn run(
    options: &ServerOptions,
    board_type: &str,
    bitstream: &Path,
) -> ProgrammingResult {
    let mut cmd = Command::new(&options.programmer);
    let _ = cmd
        .arg("-v")
        .arg("-b")
        .arg(board_type)
        .arg(bitstream)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!("spawning command: {cmd:?}");

    match timeout(options.program_timeout, cmd.output()).await {
        Ok(Ok(output)) => ProgrammingResult {
            // a tool killed by a signal has no exit code; report it like a timeout
            returncode: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Ok(Err(e)) => {
            error!("could not launch {}: {e}", options.programmer);
            ProgrammingResult::failure(e.to_string())
        }
        Err(_) => {
            // dropping the output future kills the child (kill_on_drop), so a
            // wedged tool cannot keep the board's programming interface open
            error!(
                "programming timed out after {}s",
                options.program_timeout.as_secs()
            );
            ProgrammingResult::failure("Timeout expired")
        }
    }
}
