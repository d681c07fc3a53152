use crate::command::LaunchPlan;
use crate::error::{LaunchError, LaunchErrorExt};
use std::process::ExitStatus;
use tracing::{info, warn};

/// Runs the plan to completion and returns the child's status unchanged.
///
/// # Errors
/// Returns [`LaunchError::Spawn`] if the launcher program cannot be started.
pub fn execute(plan: &LaunchPlan) -> Result<ExitStatus, LaunchError> {
    info!(
        program = %plan.program,
        stage = %plan.stage,
        nodes = plan.topology.world_size,
        node_rank = plan.topology.rank,
        "Starting launcher"
    );

    let status = plan
        .to_command()
        .status()
        .context(format!("Running '{}'", plan.program))?;

    if status.success() {
        info!(stage = %plan.stage, "Launcher finished");
    } else {
        warn!(stage = %plan.stage, %status, "Launcher exited unsuccessfully");
    }

    Ok(status)
}

/// Process exit code mirroring `status`, as a shell would report it.
///
/// Signal terminations map to `128 + signal` on unix.
#[must_use]
pub fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code & 0xff).unwrap_or(1);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from((128 + signal) & 0xff).unwrap_or(1);
        }
    }

    1
}
