//! Manager configuration.

use serde::{Deserialize, Serialize};

/// Sizing hints and feature toggles for [`crate::manager::AnimationManager`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity of the per-tick applier map (targets drawn per tick).
    pub applier_capacity: usize,
    /// Initial capacity of the per-target composer map.
    pub composer_capacity: usize,
    /// Drop composers and runs of entities the host reports as dead.
    pub stale_sweep: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            applier_capacity: 64,
            composer_capacity: 64,
            stale_sweep: true,
        }
    }
}
