// src/acquisition/mod.rs
//! Device configuration, layout negotiation and streaming

pub mod capability;
pub mod controller;
pub mod layout;
pub mod metadata;
pub mod planner;
pub mod selector;

pub use capability::CapabilityQuery;
pub use controller::EgdAcquisition;
pub use layout::{AcquisitionLayout, GroupBinding, GROUP_TABLE};
pub use metadata::build_metadata;
pub use planner::{samples_per_cycle, FramePlan, GroupPlan};
pub use selector::SelectorRules;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an acquisition controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Unconfigured,
    Configured,
    /// Device handle open, no acquisition groups installed
    Open,
    /// Groups installed, ready to start
    Ready,
    Streaming,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Unconfigured => "unconfigured",
            LifecycleState::Configured => "configured",
            LifecycleState::Open => "open",
            LifecycleState::Ready => "ready",
            LifecycleState::Streaming => "streaming",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
