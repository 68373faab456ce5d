// src/hal/types.rs
//! Core types shared with eegdev-compatible acquisition backends

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// errno values reported by acquisition backends
pub mod errno {
    pub const EPERM: i32 = 1;
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EFAULT: i32 = 14;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
}

/// Semantic channel group of an acquisition device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Primary biosignal channels (EEG)
    Signal,
    /// Secondary sensor channels (EXG)
    Auxiliary,
    /// Digital trigger / event channels
    Trigger,
}

impl GroupKind {
    /// Every group kind, in device order
    pub const ALL: [GroupKind; 3] = [GroupKind::Signal, GroupKind::Auxiliary, GroupKind::Trigger];
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Signal => write!(f, "EEG"),
            GroupKind::Auxiliary => write!(f, "EXG"),
            GroupKind::Trigger => write!(f, "TRIGGER"),
        }
    }
}

/// Encoding of samples written into a destination buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    Float32,
    Int32,
}

impl SampleEncoding {
    /// Size in bytes of one encoded sample
    pub const fn size(self) -> usize {
        match self {
            SampleEncoding::Float32 => std::mem::size_of::<f32>(),
            SampleEncoding::Int32 => std::mem::size_of::<i32>(),
        }
    }
}

/// Static device properties reachable through the capability query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DeviceType,
    DeviceId,
    SampleRate,
}

/// Value returned by a capability query
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityValue {
    Text(String),
    Rate(u32),
}

/// Descriptive record of a single channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub unit: String,
    pub transducer: String,
    pub prefiltering: String,
    pub calibration_range: [f64; 2],
    pub is_integer: bool,
    pub label: String,
}

/// Device identity discovered during setup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub model: String,
    pub id: String,
}

/// Binding between a channel group and its placement in the destination buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub kind: GroupKind,
    /// Index of the destination buffer receiving this group
    pub buffer_index: usize,
    /// Byte offset of the group's first channel within each sample row
    pub offset: usize,
    pub encoding: SampleEncoding,
    pub channel_count: usize,
}

/// Error reported by an acquisition backend, errno style
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{text} (errno {code})")]
pub struct VendorError {
    pub code: i32,
    pub text: String,
}

impl VendorError {
    pub fn new(code: i32, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// Build from an errno value using the operating system's description
    pub fn from_errno(code: i32) -> Self {
        Self::new(code, std::io::Error::from_raw_os_error(code).to_string())
    }

    pub fn from_io(err: &std::io::Error) -> Self {
        Self::new(err.raw_os_error().unwrap_or(errno::EIO), err.to_string())
    }
}

/// Mutable view over one destination buffer handed to `get_data`
#[derive(Debug)]
pub enum DestinationBuffer<'a> {
    Float32(&'a mut [f32]),
    Int32(&'a mut [i32]),
}

impl DestinationBuffer<'_> {
    pub fn encoding(&self) -> SampleEncoding {
        match self {
            DestinationBuffer::Float32(_) => SampleEncoding::Float32,
            DestinationBuffer::Int32(_) => SampleEncoding::Int32,
        }
    }

    /// Buffer length in bytes
    pub fn len_bytes(&self) -> usize {
        match self {
            DestinationBuffer::Float32(buf) => buf.len() * SampleEncoding::Float32.size(),
            DestinationBuffer::Int32(buf) => buf.len() * SampleEncoding::Int32.size(),
        }
    }

    /// Write one sample at `byte_offset`, converting to the buffer's encoding.
    pub fn write(
        &mut self,
        encoding: SampleEncoding,
        byte_offset: usize,
        value: f64,
    ) -> Result<(), VendorError> {
        if encoding != self.encoding() {
            return Err(VendorError::new(
                errno::EINVAL,
                format!("datatype mismatch: group uses {:?}, buffer holds {:?}", encoding, self.encoding()),
            ));
        }
        if byte_offset % encoding.size() != 0 {
            return Err(VendorError::new(
                errno::EINVAL,
                format!("misaligned offset {} for {:?}", byte_offset, encoding),
            ));
        }

        let index = byte_offset / encoding.size();
        let len = self.len_bytes();
        let out_of_range =
            || VendorError::new(errno::EFAULT, format!("offset {} beyond buffer of {} bytes", byte_offset, len));

        match self {
            DestinationBuffer::Float32(buf) => *buf.get_mut(index).ok_or_else(out_of_range)? = value as f32,
            DestinationBuffer::Int32(buf) => *buf.get_mut(index).ok_or_else(out_of_range)? = value as i32,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_sizes() {
        assert_eq!(SampleEncoding::Float32.size(), 4);
        assert_eq!(SampleEncoding::Int32.size(), 4);
    }

    #[test]
    fn test_destination_write_converts_to_encoding() {
        let mut data = vec![0i32; 4];
        let mut buffer = DestinationBuffer::Int32(&mut data);
        buffer.write(SampleEncoding::Int32, 8, 3.7).unwrap();
        assert_eq!(data, vec![0, 0, 3, 0]);
    }

    #[test]
    fn test_destination_write_rejects_mismatch_and_overflow() {
        let mut data = vec![0.0f32; 2];
        let mut buffer = DestinationBuffer::Float32(&mut data);

        let err = buffer.write(SampleEncoding::Int32, 0, 1.0).unwrap_err();
        assert_eq!(err.code, errno::EINVAL);

        let err = buffer.write(SampleEncoding::Float32, 2, 1.0).unwrap_err();
        assert_eq!(err.code, errno::EINVAL);

        let err = buffer.write(SampleEncoding::Float32, 8, 1.0).unwrap_err();
        assert_eq!(err.code, errno::EFAULT);
    }

    #[test]
    fn test_vendor_error_display() {
        let err = VendorError::new(errno::ENODEV, "No such device");
        assert_eq!(err.to_string(), "No such device (errno 19)");
        assert!(!VendorError::from_errno(errno::EIO).text.is_empty());
    }

    #[test]
    fn test_vendor_error_from_io() {
        let os = std::io::Error::from_raw_os_error(errno::ENOENT);
        let err = VendorError::from_io(&os);
        assert_eq!(err.code, errno::ENOENT);
        assert_eq!(err.text, os.to_string());

        let custom = std::io::Error::new(std::io::ErrorKind::Other, "truncated recording");
        let err = VendorError::from_io(&custom);
        assert_eq!(err.code, errno::EIO);
        assert_eq!(err.text, "truncated recording");
    }

    #[test]
    fn test_group_kind_serialization() {
        let json = serde_json::to_string(&GroupKind::Auxiliary).expect("Failed to serialize");
        assert_eq!(json, "\"auxiliary\"");
        let kind: GroupKind = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(kind, GroupKind::Auxiliary);
    }
}
