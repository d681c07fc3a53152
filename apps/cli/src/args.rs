//! # CLI Argument Definitions
//!
//! Global options select configuration and logging; subcommands launch a
//! training stage, inspect the dependency manifest or score predictions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vtl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Distributed launcher for video-language model training")]
pub struct Cli {
    /// Configuration file (defaults to ./vtl.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to <dir>/vtl.log
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Pretrain the multimodal projector
    Pretrain(TrainArgs),
    /// Fine-tune the full model on instruction data
    Finetune(TrainArgs),
    /// Inspect the dependency manifest
    Deps {
        #[command(subcommand)]
        action: DepsAction,
    },
    /// Score a generated-predictions file
    Eval {
        /// JSON lines with "predict" and "label" fields
        predictions: PathBuf,

        /// Print the scores as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Number of nodes, used when WORLD_SIZE/NPROC_PER_NODE are not both set
    pub world_size: Option<u32>,

    /// Processes per node, used when WORLD_SIZE/NPROC_PER_NODE are not both set
    pub nproc_per_node: Option<u32>,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Override tracking.run_name
    #[arg(long)]
    pub run_name: Option<String>,

    /// Override paths.output_dir
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum DepsAction {
    /// List base requirements and the available extras
    List {
        /// Manifest file (TOML or requirements.txt); the built-in one otherwise
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
    /// Print requirements.txt for the base set plus the given extras
    Resolve {
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Comma-separated extras, or 'all'
        #[arg(short, long, value_delimiter = ',')]
        extras: Vec<String>,
    },
}
