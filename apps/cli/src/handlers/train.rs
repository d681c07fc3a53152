use crate::args::TrainArgs;
use anyhow::Context;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use vtl_domain::config::LaunchConfig;
use vtl_domain::stage::Stage;
use vtl_kernel::config::load_config;
use vtl_launch::Launcher;
use vtl_launch::executor::{execute, exit_code};
use vtl_launch::topology::ProcessEnv;

/// Plans a training stage and runs it, or prints it with `--dry-run`.
///
/// # Errors
/// Returns an error if the configuration is malformed, the topology or batch
/// sizes are invalid, or the launcher cannot be started. A launcher that
/// starts and then fails is reported through the exit code instead.
pub fn run(config: Option<&Path>, stage: Stage, args: &TrainArgs) -> anyhow::Result<ExitCode> {
    let mut config: LaunchConfig = load_config(config).context("Configuration is malformed")?;
    if let Some(run_name) = &args.run_name {
        config.tracking.run_name.clone_from(run_name);
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir.clone_from(output_dir);
    }

    let plan = Launcher::builder()
        .config(config)
        .stage(stage)
        .world_size(args.world_size)
        .nproc_per_node(args.nproc_per_node)
        .build(&ProcessEnv)
        .with_context(|| format!("Cannot plan the {stage} stage"))?;

    if args.dry_run {
        info!(%stage, "Dry run, launcher not started");
        println!("{plan}");
        return Ok(ExitCode::SUCCESS);
    }

    let status = execute(&plan)?;
    Ok(ExitCode::from(exit_code(status)))
}
