// src/acquisition/capability.rs
//! Typed capability queries over an open device handle

use crate::error::{AcqError, AcqResult, CapabilityField};
use crate::hal::{errno, Capability, CapabilityValue, ChannelInfo, DeviceIdentity, EgdDevice, GroupKind, VendorError};

/// Read-only query layer borrowing a device handle for the duration of setup.
///
/// Every failure is reported as [`AcqError::Capability`] naming the field that
/// could not be read. Nothing is defaulted.
pub struct CapabilityQuery<'a> {
    device: &'a dyn EgdDevice,
}

impl<'a> CapabilityQuery<'a> {
    pub fn new(device: &'a dyn EgdDevice) -> Self {
        Self { device }
    }

    /// Device model and identifier
    pub fn identity(&self) -> AcqResult<DeviceIdentity> {
        Ok(DeviceIdentity {
            model: self.text(Capability::DeviceType)?,
            id: self.text(Capability::DeviceId)?,
        })
    }

    /// Native sampling rate [Hz]
    pub fn sample_rate(&self) -> AcqResult<u32> {
        match self.cap(Capability::SampleRate)? {
            CapabilityValue::Rate(rate) => Ok(rate),
            other => Err(unexpected(Capability::SampleRate, &other)),
        }
    }

    pub fn channel_count(&self, kind: GroupKind) -> AcqResult<usize> {
        self.device.get_numch(kind).map_err(|source| AcqError::Capability {
            field: CapabilityField::ChannelCount(kind),
            source,
        })
    }

    pub fn channel_info(&self, kind: GroupKind, channel: usize) -> AcqResult<ChannelInfo> {
        self.device
            .channel_info(kind, channel)
            .map_err(|source| AcqError::Capability {
                field: CapabilityField::ChannelInfo { kind, channel },
                source,
            })
    }

    fn cap(&self, cap: Capability) -> AcqResult<CapabilityValue> {
        self.device.get_cap(cap).map_err(|source| AcqError::Capability {
            field: CapabilityField::of(cap),
            source,
        })
    }

    fn text(&self, cap: Capability) -> AcqResult<String> {
        match self.cap(cap)? {
            CapabilityValue::Text(text) => Ok(text),
            other => Err(unexpected(cap, &other)),
        }
    }
}

fn unexpected(cap: Capability, value: &CapabilityValue) -> AcqError {
    AcqError::Capability {
        field: CapabilityField::of(cap),
        source: VendorError::new(errno::EINVAL, format!("unexpected capability value {:?}", value)),
    }
}
