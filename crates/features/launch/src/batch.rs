use crate::error::LaunchError;
use crate::topology::Topology;
use tracing::debug;

/// Batch sizes for one launch and the accumulation steps derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub global: u32,
    pub local: u32,
    pub devices: u32,
    pub accumulation_steps: u32,
}

impl BatchPlan {
    /// Derives the plan for `topology`.
    ///
    /// # Errors
    /// See [`accumulation_steps`].
    pub fn derive(global: u32, local: u32, topology: &Topology) -> Result<Self, LaunchError> {
        let accumulation_steps =
            accumulation_steps(global, topology.world_size, topology.nproc_per_node, local)?;
        let devices = topology.world_size * topology.nproc_per_node;
        debug!(global, local, devices, accumulation_steps, "Derived batch plan");
        Ok(Self { global, local, devices, accumulation_steps })
    }
}

/// `global / (world_size * nproc_per_node * local)`, required to be exact.
///
/// # Errors
/// * [`LaunchError::InvalidBatch`] if any argument is zero or the divisor overflows.
/// * [`LaunchError::InexactAccumulation`] if the division leaves a remainder.
pub fn accumulation_steps(
    global: u32,
    world_size: u32,
    nproc_per_node: u32,
    local: u32,
) -> Result<u32, LaunchError> {
    for (name, value) in [
        ("global batch size", global),
        ("world size", world_size),
        ("processes per node", nproc_per_node),
        ("local batch size", local),
    ] {
        if value == 0 {
            return Err(LaunchError::InvalidBatch { message: format!("{name} must be positive").into() });
        }
    }

    let overflow = || LaunchError::InvalidBatch {
        message: format!(
            "{world_size} nodes x {nproc_per_node} processes x {local} samples overflows"
        )
        .into(),
    };
    let devices = world_size.checked_mul(nproc_per_node).ok_or_else(overflow)?;
    let per_step = devices.checked_mul(local).ok_or_else(overflow)?;

    let remainder = global % per_step;
    if remainder != 0 {
        return Err(LaunchError::InexactAccumulation { global, devices, local, per_step, remainder });
    }

    Ok(global / per_step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_layouts() {
        assert_eq!(accumulation_steps(128, 1, 4, 4).unwrap(), 8);
        assert_eq!(accumulation_steps(256, 1, 4, 8).unwrap(), 8);
        assert_eq!(accumulation_steps(128, 2, 8, 4).unwrap(), 2);
        assert_eq!(accumulation_steps(32, 1, 8, 4).unwrap(), 1);
    }

    #[test]
    fn inexact_division_is_rejected() {
        let err = accumulation_steps(100, 1, 4, 8).unwrap_err();
        assert!(matches!(
            err,
            LaunchError::InexactAccumulation { per_step: 32, remainder: 4, .. }
        ));
    }

    #[test]
    fn global_smaller_than_one_step_is_rejected() {
        assert!(matches!(
            accumulation_steps(16, 2, 4, 4).unwrap_err(),
            LaunchError::InexactAccumulation { remainder: 16, .. }
        ));
    }

    #[test]
    fn zero_factors_are_rejected() {
        for (g, w, p, l) in [(0, 1, 4, 4), (128, 0, 4, 4), (128, 1, 0, 4), (128, 1, 4, 0)] {
            assert!(matches!(
                accumulation_steps(g, w, p, l).unwrap_err(),
                LaunchError::InvalidBatch { .. }
            ));
        }
    }

    #[test]
    fn overflowing_divisor_is_rejected() {
        let err = accumulation_steps(128, u32::MAX, 2, 1).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }
}
