//! Names shared between the launcher and the processes it starts.

/// Number of participating nodes.
pub const ENV_WORLD_SIZE: &str = "WORLD_SIZE";
/// Worker processes per node.
pub const ENV_NPROC_PER_NODE: &str = "NPROC_PER_NODE";
pub const ENV_MASTER_ADDR: &str = "MASTER_ADDR";
pub const ENV_MASTER_PORT: &str = "MASTER_PORT";
/// Ordinal of this node within the job.
pub const ENV_RANK: &str = "RANK";

/// Members of the world-size fallback group, in resolution order.
pub const WORLD_GROUP: [&str; 2] = [ENV_WORLD_SIZE, ENV_NPROC_PER_NODE];
/// Members of the rendezvous fallback group, in resolution order.
pub const RENDEZVOUS_GROUP: [&str; 3] = [ENV_MASTER_ADDR, ENV_MASTER_PORT, ENV_RANK];

/// Exported to the trainer to keep model hubs offline.
pub const ENV_TRANSFORMERS_OFFLINE: &str = "TRANSFORMERS_OFFLINE";
/// Exported to the trainer as the experiment-tracking namespace.
pub const ENV_WANDB_PROJECT: &str = "WANDB_PROJECT";

/// Prefix of configuration overrides taken from the environment (`VTL__TRACKING__RUN_NAME`).
pub const CONFIG_ENV_PREFIX: &str = "VTL";
/// Configuration file looked up when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "vtl.toml";
