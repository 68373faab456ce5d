// src/frame/mod.rs
//! Grouped sample frame exchanged with the acquisition pipeline
//!
//! A [`NeuroFrame`] holds one cycle of samples for each channel group. Every
//! group stores its samples row-major (`samples x channels`), so the stride
//! between two consecutive time samples is `channels * size_of::<T>()` bytes.

use crate::hal::{DestinationBuffer, GroupKind, SampleEncoding};
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Normalized descriptive metadata of a channel group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub unit: String,
    pub transducer: String,
    pub prefiltering: String,
    pub calibration_range: [f64; 2],
    pub is_integer: bool,
    pub labels: Vec<String>,
}

impl Default for ChannelMetadata {
    fn default() -> Self {
        Self {
            unit: String::new(),
            transducer: String::new(),
            prefiltering: String::new(),
            calibration_range: [0.0, 1.0],
            is_integer: false,
            labels: Vec::new(),
        }
    }
}

/// Sample types a frame group can hold
pub trait Sample: Copy + Default + Send + 'static {
    const ENCODING: SampleEncoding;

    fn destination(buf: &mut [Self]) -> DestinationBuffer<'_>;
}

impl Sample for f32 {
    const ENCODING: SampleEncoding = SampleEncoding::Float32;

    fn destination(buf: &mut [Self]) -> DestinationBuffer<'_> {
        DestinationBuffer::Float32(buf)
    }
}

impl Sample for i32 {
    const ENCODING: SampleEncoding = SampleEncoding::Int32;

    fn destination(buf: &mut [Self]) -> DestinationBuffer<'_> {
        DestinationBuffer::Int32(buf)
    }
}

/// Sample storage and metadata of one channel group
#[derive(Debug, Clone)]
pub struct NeuroData<T: Sample> {
    data: Array2<T>,
    info: ChannelMetadata,
}

impl<T: Sample> Default for NeuroData<T> {
    fn default() -> Self {
        Self {
            data: Array2::default((0, 0)),
            info: ChannelMetadata::default(),
        }
    }
}

impl<T: Sample> NeuroData<T> {
    /// Allocate zeroed storage for `nsamples` samples of `nchannels` channels
    pub fn reserve(&mut self, nsamples: usize, nchannels: usize) {
        self.data = Array2::default((nsamples, nchannels));
    }

    pub fn nsamples(&self) -> usize {
        self.data.nrows()
    }

    pub fn nchannels(&self) -> usize {
        self.data.ncols()
    }

    /// Byte distance between two consecutive time samples
    pub fn stride(&self) -> usize {
        self.nchannels() * std::mem::size_of::<T>()
    }

    /// Number of elements the storage can hold
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn encoding(&self) -> SampleEncoding {
        T::ENCODING
    }

    /// Raw row-major storage
    pub fn data(&self) -> &[T] {
        self.data.as_slice().unwrap_or(&[])
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        self.data.as_slice_mut().unwrap_or(&mut [])
    }

    /// Samples as a `samples x channels` view
    pub fn samples(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// All samples of one channel, if it exists
    pub fn channel(&self, index: usize) -> Option<ArrayView1<'_, T>> {
        (index < self.nchannels()).then(|| self.data.column(index))
    }

    pub fn info(&self) -> &ChannelMetadata {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut ChannelMetadata {
        &mut self.info
    }

    fn destination(&mut self) -> DestinationBuffer<'_> {
        T::destination(self.data_mut())
    }
}

/// Shape of one group after layout planning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupShape {
    pub channels: usize,
    pub samples: usize,
    pub stride: usize,
    pub encoding: SampleEncoding,
}

/// One scheduling cycle of samples across the signal, auxiliary and trigger groups
#[derive(Debug, Clone, Default)]
pub struct NeuroFrame {
    /// Native sampling rate of the device that filled the frame [Hz]
    pub sample_rate: u32,
    pub eeg: NeuroData<f32>,
    pub exg: NeuroData<f32>,
    pub tri: NeuroData<i32>,
}

impl NeuroFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(&self, kind: GroupKind) -> GroupShape {
        match kind {
            GroupKind::Signal => shape_of(&self.eeg),
            GroupKind::Auxiliary => shape_of(&self.exg),
            GroupKind::Trigger => shape_of(&self.tri),
        }
    }

    pub fn reserve(&mut self, kind: GroupKind, nsamples: usize, nchannels: usize) {
        match kind {
            GroupKind::Signal => self.eeg.reserve(nsamples, nchannels),
            GroupKind::Auxiliary => self.exg.reserve(nsamples, nchannels),
            GroupKind::Trigger => self.tri.reserve(nsamples, nchannels),
        }
    }

    pub fn metadata(&self, kind: GroupKind) -> &ChannelMetadata {
        match kind {
            GroupKind::Signal => self.eeg.info(),
            GroupKind::Auxiliary => self.exg.info(),
            GroupKind::Trigger => self.tri.info(),
        }
    }

    pub fn metadata_mut(&mut self, kind: GroupKind) -> &mut ChannelMetadata {
        match kind {
            GroupKind::Signal => self.eeg.info_mut(),
            GroupKind::Auxiliary => self.exg.info_mut(),
            GroupKind::Trigger => self.tri.info_mut(),
        }
    }

    /// Mutable views over the storage of every group, tagged by kind
    pub fn destinations(&mut self) -> [(GroupKind, DestinationBuffer<'_>); 3] {
        [
            (GroupKind::Signal, self.eeg.destination()),
            (GroupKind::Auxiliary, self.exg.destination()),
            (GroupKind::Trigger, self.tri.destination()),
        ]
    }
}

fn shape_of<T: Sample>(data: &NeuroData<T>) -> GroupShape {
    GroupShape {
        channels: data.nchannels(),
        samples: data.nsamples(),
        stride: data.stride(),
        encoding: data.encoding(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_sets_shape_and_stride() {
        let mut frame = NeuroFrame::new();
        frame.reserve(GroupKind::Signal, 32, 16);
        frame.reserve(GroupKind::Trigger, 32, 1);

        let eeg = frame.shape(GroupKind::Signal);
        assert_eq!((eeg.samples, eeg.channels, eeg.stride), (32, 16, 64));
        assert_eq!(eeg.encoding, SampleEncoding::Float32);
        assert_eq!(frame.eeg.capacity(), 32 * 16);

        let tri = frame.shape(GroupKind::Trigger);
        assert_eq!((tri.samples, tri.channels, tri.stride), (32, 1, 4));
        assert_eq!(tri.encoding, SampleEncoding::Int32);

        let exg = frame.shape(GroupKind::Auxiliary);
        assert_eq!((exg.samples, exg.channels, exg.stride), (0, 0, 0));
    }

    #[test]
    fn test_reserve_replaces_storage() {
        let mut data = NeuroData::<f32>::default();
        data.reserve(8, 4);
        data.data_mut()[5] = 1.5;
        data.reserve(8, 4);
        assert!(data.data().iter().all(|&x| x == 0.0));
        assert_eq!(data.data().len(), 32);
    }

    #[test]
    fn test_channel_view_is_column() {
        let mut data = NeuroData::<i32>::default();
        data.reserve(3, 2);
        data.data_mut().copy_from_slice(&[1, 10, 2, 20, 3, 30]);

        let ch1 = data.channel(1).unwrap();
        assert_eq!(ch1.to_vec(), vec![10, 20, 30]);
        assert!(data.channel(2).is_none());
    }

    #[test]
    fn test_default_metadata_calibration_range() {
        let meta = ChannelMetadata::default();
        assert_eq!(meta.calibration_range, [0.0, 1.0]);
        assert!(meta.labels.is_empty());
    }

    #[test]
    fn test_destinations_cover_all_groups() {
        let mut frame = NeuroFrame::new();
        frame.reserve(GroupKind::Signal, 2, 2);
        let kinds: Vec<_> = frame.destinations().iter().map(|(k, b)| (*k, b.encoding())).collect();
        assert_eq!(
            kinds,
            vec![
                (GroupKind::Signal, SampleEncoding::Float32),
                (GroupKind::Auxiliary, SampleEncoding::Float32),
                (GroupKind::Trigger, SampleEncoding::Int32),
            ]
        );
    }
}
