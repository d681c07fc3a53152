//! # Launch Planning
//!
//! Turns configuration, positional arguments and the distributed-training
//! environment into one `torchrun` invocation, then hands it off.
//!
//! ## Flow
//!
//! 1.  **Topology ([`topology`])**: `WORLD_SIZE`/`NPROC_PER_NODE` and
//!     `MASTER_ADDR`/`MASTER_PORT`/`RANK` are resolved group by group.
//! 2.  **Batch ([`batch`])**: gradient accumulation steps are derived and must
//!     divide exactly.
//! 3.  **Profile ([`profile`])**: the stage preset produces the trainer flags.
//! 4.  **Command ([`command`])**: everything is assembled into a [`LaunchPlan`].
//! 5.  **Executor ([`executor`])**: the plan is run and its exit status returned.
//!
//! ## Example
//! ```rust
//! use std::collections::HashMap;
//! use vtl_domain::stage::Stage;
//! use vtl_launch::Launcher;
//!
//! let env: HashMap<&str, &str> = HashMap::new();
//! let plan = Launcher::builder().stage(Stage::Finetune).build(&env).unwrap();
//!
//! assert_eq!(plan.batch.accumulation_steps, 8);
//! assert_eq!(plan.program, "torchrun");
//! ```

pub mod batch;
pub mod command;
mod error;
pub mod executor;
pub mod profile;
pub mod topology;

pub use crate::command::LaunchPlan;
pub use crate::error::{LaunchError, LaunchErrorExt};

use crate::batch::BatchPlan;
use crate::profile::StagePreset;
use crate::topology::{EnvSource, Topology, TopologyDefaults};
use tracing::info;
use vtl_domain::config::LaunchConfig;
use vtl_domain::constants::{ENV_TRANSFORMERS_OFFLINE, ENV_WANDB_PROJECT};
use vtl_domain::stage::Stage;

/// A fluent builder producing a [`LaunchPlan`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Clone)]
pub struct Launcher {
    config: LaunchConfig,
    stage: Stage,
    world_size: Option<u32>,
    nproc_per_node: Option<u32>,
}

impl Default for Launcher {
    fn default() -> Self {
        Self { config: LaunchConfig::default(), stage: Stage::Finetune, world_size: None, nproc_per_node: None }
    }
}

impl Launcher {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: LaunchConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// First positional argument: fallback world size.
    pub const fn world_size(mut self, world_size: Option<u32>) -> Self {
        self.world_size = world_size;
        self
    }

    /// Second positional argument: fallback processes per node.
    pub const fn nproc_per_node(mut self, nproc_per_node: Option<u32>) -> Self {
        self.nproc_per_node = nproc_per_node;
        self
    }

    /// Resolves everything against `env` and assembles the plan.
    ///
    /// # Errors
    /// * [`LaunchError::InvalidEnv`] for unparseable distributed variables.
    /// * [`LaunchError::InvalidBatch`] / [`LaunchError::InexactAccumulation`] when
    ///   the batch sizes do not fit the topology.
    pub fn build(self, env: &impl EnvSource) -> Result<LaunchPlan, LaunchError> {
        let Self { config, stage, world_size, nproc_per_node } = self;

        let defaults = TopologyDefaults::from_args(world_size, nproc_per_node, &config.topology);
        let topology = Topology::resolve(env, &defaults)?;

        let preset = StagePreset::for_stage(stage).with_overrides(&config);
        let batch = BatchPlan::derive(preset.global_batch_size, preset.local_batch_size, &topology)?;
        let train_args = profile::training_args(&config, &preset, &batch);

        let mut exported = Vec::with_capacity(2);
        if config.tracking.offline {
            exported.push((ENV_TRANSFORMERS_OFFLINE, "1".to_owned()));
        }
        exported.push((ENV_WANDB_PROJECT, config.tracking.project.clone()));

        info!(
            %stage,
            global = batch.global,
            local = batch.local,
            gradient_accumulation_steps = batch.accumulation_steps,
            "Planned launch"
        );

        Ok(LaunchPlan {
            stage,
            program: config.launcher.program.clone(),
            entry_point: config.launcher.entry_point.clone(),
            topology,
            batch,
            train_args,
            env: exported,
        })
    }
}
