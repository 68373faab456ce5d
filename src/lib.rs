//! EGD-Acquisition: eegdev-compatible biosignal acquisition adapter
//!
//! This library drives multi-channel biosignal devices through an
//! eegdev-style capability and streaming API and exposes the acquired
//! samples as a grouped frame (EEG, EXG and trigger channels). It features:
//!
//! - Capability discovery and per-group channel metadata
//! - Frame layout planning from the native rate and a target framerate
//! - Group/stride descriptors installed on the device as one unit
//! - A lifecycle controller with strict, logged error semantics
//! - Layered configuration and a simulated device layer
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use egd_acquisition::config::{constants::keys, MemoryParameters};
//! use egd_acquisition::hal::simulator::{SimulatorConfig, SimulatorLayer};
//! use egd_acquisition::{Device, EgdAcquisition, NeuroFrame};
//!
//! let layer = SimulatorLayer::new(SimulatorConfig::default());
//! let params = MemoryParameters::new()
//!     .with_string(keys::DEVARG, "gtec")
//!     .with_integer(keys::SAMPLERATE, 512);
//! let mut device = EgdAcquisition::new(Box::new(layer), Box::new(params));
//!
//! assert!(device.configure(NeuroFrame::new(), 16));
//! assert!(device.open());
//! assert!(device.setup());
//! assert!(device.start());
//! for _ in 0..10 {
//!     if let Some(count) = device.get() {
//!         println!("{} samples, first EEG row: {:?}", count, device.frame().eeg.samples().row(0));
//!     }
//! }
//! device.close();
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod hal;
pub mod utils;

// Re-export commonly used types for convenience
pub use acquisition::{AcquisitionLayout, EgdAcquisition, LifecycleState, SelectorRules};
pub use config::{AcquisitionConfig, ConfigLoader, DeviceConfig, MemoryParameters, ParameterSource};
pub use device::Device;
pub use error::{AcqError, AcqResult};
pub use frame::{ChannelMetadata, NeuroData, NeuroFrame};
pub use hal::{DeviceLayer, EgdDevice, GroupKind, LayoutDescriptor, VendorError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "egd-acquisition");
    }
}
