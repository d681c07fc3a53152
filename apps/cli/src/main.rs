#![allow(clippy::print_stdout)]

pub mod args;
pub mod handlers;

use crate::args::{Cli, Commands, DepsAction};
use crate::handlers::{deps, eval, train};

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use vtl_domain::stage::Stage;
use vtl_logger::Logger;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let logger = Logger::builder().name(env!("CARGO_BIN_NAME")).verbosity(cli.verbose);
    let _log = match &cli.log_dir {
        Some(dir) => logger.path(dir).init()?,
        None => logger.init()?,
    };

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Pretrain(args) => train::run(config, Stage::Pretrain, &args),
        Commands::Finetune(args) => train::run(config, Stage::Finetune, &args),
        Commands::Deps { action } => match action {
            DepsAction::List { manifest } => deps::list(manifest.as_deref()),
            DepsAction::Resolve { manifest, extras } => deps::resolve(manifest.as_deref(), &extras),
        },
        Commands::Eval { predictions, json } => eval::run(&predictions, json),
    }
}
