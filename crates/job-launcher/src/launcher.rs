use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::context::ExecutionContext;
use crate::error::LaunchError;
use crate::log_sink::LogSink;

/// Spawns the job described by `ctx` with stdout and stderr appended to
/// `sink`, and returns its pid without waiting for it.
///
/// The child receives its own duplicates of the log descriptor, so the
/// parent's copies are released when this returns. The `Child` handle is
/// dropped right away; tokio reaps the process once it exits. Must be
/// called from within a tokio runtime.
pub fn launch(ctx: ExecutionContext, sink: LogSink) -> Result<u32, LaunchError> {
    if !ctx.script_path.exists() {
        return Err(LaunchError::NotFound {
            path: ctx.script_path,
        });
    }

    let (log_path, stderr_file) = sink.into_parts();
    let stdout_file = stderr_file
        .try_clone()
        .map_err(|err| LaunchError::SpawnFailed {
            program: ctx.program.display().to_string(),
            message: format!(
                "failed to duplicate log handle {}: {}",
                log_path.display(),
                err
            ),
        })?;

    let mut command = Command::new(&ctx.program);
    command
        .args(&ctx.args)
        .envs(&ctx.env)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file))
        .kill_on_drop(false);

    // Keep terminal signals aimed at the service away from running jobs.
    #[cfg(unix)]
    command.process_group(0);

    debug!(command = %ctx.command_line(), "spawning diagnosis job");

    let child = command.spawn().map_err(|err| match err.kind() {
        ErrorKind::NotFound => LaunchError::NotFound {
            path: ctx.program.clone(),
        },
        _ => LaunchError::SpawnFailed {
            program: ctx.program.display().to_string(),
            message: err.to_string(),
        },
    })?;

    let pid = child.id().ok_or_else(|| LaunchError::SpawnFailed {
        program: ctx.program.display().to_string(),
        message: "process exited before its id could be read".to_string(),
    })?;

    info!(
        pid,
        dataset = %ctx.identifier,
        log_path = %log_path.display(),
        "diagnosis job launched"
    );

    drop(child);
    Ok(pid)
}
