//! Resolution of the distributed topology from the environment.
//!
//! Variables are resolved in two groups. A group is taken from the environment
//! only when **every** member is set to a non-empty value; otherwise every member
//! falls back to its default. Values are never mixed inside a group.
//!
//! | Group      | Variables                            | Defaults                          |
//! |------------|--------------------------------------|-----------------------------------|
//! | world      | `WORLD_SIZE`, `NPROC_PER_NODE`       | positional args, then config      |
//! | rendezvous | `MASTER_ADDR`, `MASTER_PORT`, `RANK` | config (`127.0.0.1`, 16666, 0)    |

use crate::error::LaunchError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use vtl_domain::config::TopologyConfig;
use vtl_domain::constants::{
    ENV_MASTER_ADDR, ENV_MASTER_PORT, ENV_NPROC_PER_NODE, ENV_RANK, ENV_WORLD_SIZE,
    RENDEZVOUS_GROUP, WORLD_GROUP,
};

/// Read access to environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;

    /// The value of `key` if it is present and non-empty.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// The environment of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| (*v).to_owned())
    }
}

/// Where a fallback group got its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Environment,
    Defaults,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Environment => "environment",
            Self::Defaults => "defaults",
        })
    }
}

/// Values used when a group is incomplete in the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyDefaults {
    pub world_size: u32,
    pub nproc_per_node: u32,
    pub master_addr: String,
    pub master_port: u16,
    pub rank: u32,
}

impl TopologyDefaults {
    /// Combines positional arguments with configured defaults; arguments win.
    #[must_use]
    pub fn from_args(
        world_size: Option<u32>,
        nproc_per_node: Option<u32>,
        config: &TopologyConfig,
    ) -> Self {
        Self {
            world_size: world_size.unwrap_or(config.world_size),
            nproc_per_node: nproc_per_node.unwrap_or(config.nproc_per_node),
            master_addr: config.master_addr.clone(),
            master_port: config.master_port,
            rank: config.rank,
        }
    }
}

impl Default for TopologyDefaults {
    fn default() -> Self {
        Self::from_args(None, None, &TopologyConfig::default())
    }
}

/// The resolved distributed topology for this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub world_size: u32,
    pub nproc_per_node: u32,
    pub master_addr: String,
    pub master_port: u16,
    pub rank: u32,
    pub world_origin: Origin,
    pub rendezvous_origin: Origin,
}

impl Topology {
    /// Total number of worker processes across all nodes.
    #[must_use]
    pub const fn devices(&self) -> Option<u32> {
        self.world_size.checked_mul(self.nproc_per_node)
    }

    /// Resolves both groups from `env`, falling back to `defaults`.
    ///
    /// # Errors
    /// Returns [`LaunchError::InvalidEnv`] when a complete group holds a value that
    /// does not parse. Incomplete groups are never parsed.
    pub fn resolve(env: &impl EnvSource, defaults: &TopologyDefaults) -> Result<Self, LaunchError> {
        let (world_size, nproc_per_node, world_origin) = match complete_group(env, &WORLD_GROUP) {
            Some(values) => (
                parse_var(ENV_WORLD_SIZE, &values[0], "unsigned integer")?,
                parse_var(ENV_NPROC_PER_NODE, &values[1], "unsigned integer")?,
                Origin::Environment,
            ),
            None => (defaults.world_size, defaults.nproc_per_node, Origin::Defaults),
        };

        let (master_addr, master_port, rank, rendezvous_origin) =
            match complete_group(env, &RENDEZVOUS_GROUP) {
                Some(mut values) => {
                    let rank = parse_var(ENV_RANK, &values[2], "unsigned integer")?;
                    let port = parse_var(ENV_MASTER_PORT, &values[1], "port number")?;
                    (values.swap_remove(0), port, rank, Origin::Environment)
                },
                None => (
                    defaults.master_addr.clone(),
                    defaults.master_port,
                    defaults.rank,
                    Origin::Defaults,
                ),
            };

        let topology = Self {
            world_size,
            nproc_per_node,
            master_addr,
            master_port,
            rank,
            world_origin,
            rendezvous_origin,
        };

        info!(
            WORLD_SIZE = topology.world_size,
            NPROC_PER_NODE = topology.nproc_per_node,
            source = %topology.world_origin,
            "Resolved world size"
        );
        debug!(
            MASTER_ADDR = %topology.master_addr,
            MASTER_PORT = topology.master_port,
            RANK = topology.rank,
            source = %topology.rendezvous_origin,
            "Resolved rendezvous"
        );

        Ok(topology)
    }
}

/// All values of `group` in order, or `None` if any member is unset or empty.
fn complete_group(env: &impl EnvSource, group: &[&str]) -> Option<Vec<String>> {
    group.iter().map(|key| env.non_empty(key)).collect()
}

fn parse_var<T: FromStr>(
    variable: &'static str,
    raw: &str,
    expected: &'static str,
) -> Result<T, LaunchError> {
    raw.trim().parse().map_err(|_| LaunchError::InvalidEnv {
        variable,
        value: raw.to_owned(),
        expected,
    })
}
