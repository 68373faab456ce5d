// src/acquisition/selector.rs
//! Device selector grammar
//!
//! The selector handed to the device layer is built from the configured
//! device argument:
//!
//! - a device argument naming a recorded file becomes `datafile|path|<devarg>`;
//! - a hardware vendor key listed in the sample-rate table gets
//!   `|<option>|<rate>` appended when a nonzero sample rate was requested;
//! - the extension suffix is appended verbatim.

use crate::config::constants::selector::{DATAFILE_PREFIX, FILE_EXTENSIONS, SAMPLERATE_OPTIONS, SEPARATOR};
use crate::config::DeviceConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Data-driven rules for building device selectors
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SelectorRules {
    /// Extensions marking the device argument as a recorded file
    #[serde(default = "defaults::file_extensions")]
    pub file_extensions: Vec<String>,

    /// Vendor key to the name of its sample-rate option
    #[serde(default = "defaults::samplerate_options")]
    pub samplerate_options: BTreeMap<String, String>,
}

mod defaults {
    use super::*;

    pub fn file_extensions() -> Vec<String> {
        FILE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    }

    pub fn samplerate_options() -> BTreeMap<String, String> {
        SAMPLERATE_OPTIONS
            .iter()
            .map(|(vendor, option)| (vendor.to_string(), option.to_string()))
            .collect()
    }
}

impl Default for SelectorRules {
    fn default() -> Self {
        Self {
            file_extensions: defaults::file_extensions(),
            samplerate_options: defaults::samplerate_options(),
        }
    }
}

impl SelectorRules {
    /// Register the sample-rate option used by a vendor key
    pub fn with_samplerate_option(mut self, vendor: &str, option: &str) -> Self {
        self.samplerate_options.insert(vendor.to_string(), option.to_string());
        self
    }

    /// Whether the device argument names a recorded file
    pub fn is_recording(&self, devarg: &str) -> bool {
        self.file_extensions
            .iter()
            .any(|ext| !ext.is_empty() && devarg.contains(ext.as_str()))
    }

    /// Sample-rate option name for a vendor key
    pub fn samplerate_option(&self, vendor: &str) -> Option<&str> {
        self.samplerate_options.get(vendor).map(String::as_str)
    }

    pub fn build(&self, devarg: &str, devext: &str, samplerate: u32) -> String {
        let mut selector = String::new();

        if self.is_recording(devarg) {
            selector.push_str(DATAFILE_PREFIX);
            selector.push_str(devarg);
        } else {
            selector.push_str(devarg);
            if samplerate > 0 {
                if let Some(option) = self.samplerate_option(devarg) {
                    selector.push(SEPARATOR);
                    selector.push_str(option);
                    selector.push(SEPARATOR);
                    selector.push_str(&samplerate.to_string());
                }
            }
        }

        selector.push_str(devext);
        selector
    }

    pub fn selector_for(&self, config: &DeviceConfig) -> String {
        self.build(&config.devarg, &config.devext, config.samplerate)
    }
}
