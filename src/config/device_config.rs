// src/config/device_config.rs
//! Device parameters and the validated configuration produced by `configure`

use crate::config::constants::{device, keys};
use crate::config::params::ParameterSource;
use crate::error::{AcqError, AcqResult};
use serde::{Deserialize, Serialize};

/// Device parameters as stored in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceParams {
    /// Hardware key or path of a recorded file
    #[serde(default)]
    pub devarg: String,

    /// Suffix appended verbatim to the device selector
    #[serde(default)]
    pub devext: String,

    /// Requested sample rate, 0 for the device default
    #[serde(default)]
    pub samplerate: u32,
}

impl Default for DeviceParams {
    fn default() -> Self {
        Self {
            devarg: String::new(),
            devext: String::new(),
            samplerate: device::DEVICE_DEFAULT_SAMPLERATE,
        }
    }
}

/// Validated device configuration, immutable once `configure` succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceConfig {
    pub devarg: String,
    pub devext: String,
    pub samplerate: u32,
    /// Target output framerate [Hz]
    pub framerate: u32,
}

impl DeviceConfig {
    /// Read `devarg`, `devext` and `samplerate` from `source`
    pub fn from_params(source: &dyn ParameterSource, framerate: u32) -> AcqResult<Self> {
        let devarg = source.string(keys::DEVARG).unwrap_or_default();
        if devarg.is_empty() {
            return Err(AcqError::Config(format!(
                "missing '{}': '{}' is a mandatory parameter",
                keys::DEVARG,
                keys::DEVARG
            )));
        }

        let devext = source.string(keys::DEVEXT).unwrap_or_default();
        let samplerate = match source.integer(keys::SAMPLERATE) {
            None => device::DEVICE_DEFAULT_SAMPLERATE,
            Some(rate) => u32::try_from(rate).map_err(|_| {
                AcqError::Config(format!("'{}' must be a non-negative rate, got {}", keys::SAMPLERATE, rate))
            })?,
        };

        let config = Self {
            devarg,
            devext,
            samplerate,
            framerate,
        };
        validate_device_config(&config)?;
        Ok(config)
    }

    /// Build directly from stored device parameters
    pub fn from_device_params(device: &DeviceParams, framerate: u32) -> AcqResult<Self> {
        let config = Self {
            devarg: device.devarg.clone(),
            devext: device.devext.clone(),
            samplerate: device.samplerate,
            framerate,
        };
        validate_device_config(&config)?;
        Ok(config)
    }
}

/// Check the invariants every configured device must satisfy
pub fn validate_device_config(config: &DeviceConfig) -> AcqResult<()> {
    if config.devarg.is_empty() {
        return Err(AcqError::Config(format!("'{}' cannot be empty", keys::DEVARG)));
    }
    if config.framerate == 0 {
        return Err(AcqError::Config("framerate must be greater than 0".to_string()));
    }
    Ok(())
}

/// Parameters of a device section are served as a parameter source
impl ParameterSource for DeviceParams {
    fn string(&self, key: &str) -> Option<String> {
        match key {
            keys::DEVARG => Some(self.devarg.clone()),
            keys::DEVEXT => Some(self.devext.clone()),
            keys::SAMPLERATE => Some(self.samplerate.to_string()),
            _ => None,
        }
    }

    fn integer(&self, key: &str) -> Option<i64> {
        match key {
            keys::SAMPLERATE => Some(self.samplerate as i64),
            _ => self.string(key)?.parse().ok(),
        }
    }
}
