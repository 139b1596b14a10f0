//! Synchronizer timing configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Window timing knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynchronizerConfig {
    /// How long a window accepts new registrations after the first one.
    #[serde(default = "default_registration_interval_ms")]
    pub registration_interval_ms: u64,

    /// How long registered callers have to submit proposals once
    /// registration closes.
    #[serde(default = "default_proposal_collection_interval_ms")]
    pub proposal_collection_interval_ms: u64,
}

impl SynchronizerConfig {
    pub fn registration_interval(&self) -> Duration {
        Duration::from_millis(self.registration_interval_ms)
    }

    pub fn proposal_collection_interval(&self) -> Duration {
        Duration::from_millis(self.proposal_collection_interval_ms)
    }
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            registration_interval_ms: default_registration_interval_ms(),
            proposal_collection_interval_ms: default_proposal_collection_interval_ms(),
        }
    }
}

fn default_registration_interval_ms() -> u64 {
    250
}

fn default_proposal_collection_interval_ms() -> u64 {
    20_000
}
