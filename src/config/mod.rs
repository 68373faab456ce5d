// src/config/mod.rs
//! Configuration management for the acquisition core

pub mod constants;
pub mod device_config;
pub mod loader;
pub mod params;

pub use constants::*;
pub use device_config::*;
pub use loader::{ConfigError, ConfigLoader};
pub use params::{MemoryParameters, ParameterSource};

use crate::acquisition::SelectorRules;
use crate::hal::simulator::SimulatorConfig;
use serde::{Deserialize, Serialize};

/// Complete acquisition configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AcquisitionConfig {
    #[serde(default)]
    pub device: DeviceParams,

    /// Target output framerate [Hz]
    #[serde(default = "defaults::framerate")]
    pub framerate: u32,

    #[serde(default)]
    pub selector: SelectorRules,

    pub simulator: Option<SimulatorConfig>,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;

    pub fn framerate() -> u32 { timing::DEFAULT_FRAMERATE_HZ }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            device: DeviceParams::default(),
            framerate: defaults::framerate(),
            selector: SelectorRules::default(),
            simulator: None,
        }
    }
}

impl AcquisitionConfig {
    /// Validate configuration consistency
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.framerate == 0 {
            errors.push("framerate must be greater than 0".to_string());
        }

        if let Some(sim) = &self.simulator {
            if sim.sampling_rate_hz == 0 {
                errors.push("simulator sampling rate must be greater than 0".to_string());
            } else if self.framerate > sim.sampling_rate_hz {
                errors.push(format!(
                    "framerate ({} Hz) exceeds the simulator sampling rate ({} Hz)",
                    self.framerate, sim.sampling_rate_hz
                ));
            }
        }

        for (vendor, option) in &self.selector.samplerate_options {
            if vendor.is_empty() || option.is_empty() {
                errors.push(format!("invalid sample-rate option '{}' -> '{}'", vendor, option));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validated device configuration for this acquisition
    pub fn device_config(&self) -> crate::error::AcqResult<DeviceConfig> {
        DeviceConfig::from_device_params(&self.device, self.framerate)
    }
}
