// src/hal/traits.rs
//! Core HAL traits modelling the eegdev capability and streaming API

use crate::hal::types::{
    Capability, CapabilityValue, ChannelInfo, DestinationBuffer, GroupKind, LayoutDescriptor,
    VendorError,
};

/// An open connection to acquisition hardware or a recorded file.
///
/// Calls are synchronous and may block; a handle is driven from a single
/// thread at a time.
pub trait EgdDevice: Send {
    /// Query a static device property
    fn get_cap(&self, cap: Capability) -> Result<CapabilityValue, VendorError>;

    /// Number of channels in a group
    fn get_numch(&self, kind: GroupKind) -> Result<usize, VendorError>;

    /// Descriptive record of one channel of a group
    fn channel_info(&self, kind: GroupKind, index: usize) -> Result<ChannelInfo, VendorError>;

    /// Install the acquisition groups. `strides[i]` is the byte distance between
    /// consecutive samples in destination buffer `i`.
    fn acq_setup(&mut self, strides: &[usize], groups: &[LayoutDescriptor]) -> Result<(), VendorError>;

    fn start(&mut self) -> Result<(), VendorError>;

    fn stop(&mut self) -> Result<(), VendorError>;

    /// Read up to `ns` samples into `buffers`, blocking until they are
    /// produced. Returns the number of samples written; fewer than `ns` means
    /// the source ran out of data.
    fn get_data(&mut self, ns: usize, buffers: &mut [DestinationBuffer<'_>]) -> Result<usize, VendorError>;

    /// Number of samples ready to be read without blocking
    fn get_available(&self) -> Result<usize, VendorError>;

    /// Release the connection
    fn close(self: Box<Self>) -> Result<(), VendorError>;
}

/// Entry point of an acquisition library: opens devices from selector strings
pub trait DeviceLayer: Send {
    fn open(&self, selector: &str) -> Result<Box<dyn EgdDevice>, VendorError>;
}
