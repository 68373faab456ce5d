// src/acquisition/layout.rs
//! Group and stride descriptors handed to the device

use crate::config::constants::device::GROUP_COUNT;
use crate::error::{AcqError, AcqResult};
use crate::frame::NeuroFrame;
use crate::hal::{DestinationBuffer, GroupKind, LayoutDescriptor, SampleEncoding};

/// Placement of one group kind in the destination buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupBinding {
    pub kind: GroupKind,
    pub buffer_index: usize,
    pub encoding: SampleEncoding,
}

/// Fixed group placement: one buffer per group, triggers as integers
pub const GROUP_TABLE: [GroupBinding; GROUP_COUNT] = [
    GroupBinding {
        kind: GroupKind::Signal,
        buffer_index: 0,
        encoding: SampleEncoding::Float32,
    },
    GroupBinding {
        kind: GroupKind::Auxiliary,
        buffer_index: 1,
        encoding: SampleEncoding::Float32,
    },
    GroupBinding {
        kind: GroupKind::Trigger,
        buffer_index: 2,
        encoding: SampleEncoding::Int32,
    },
];

/// Descriptors and strides installed on the device.
///
/// `strides()[i]` is the byte stride of destination buffer `i`, and every
/// descriptor's `buffer_index` addresses one of those buffers. The container
/// is rebuilt as a whole on every setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionLayout {
    descriptors: Vec<LayoutDescriptor>,
    strides: Vec<usize>,
}

impl AcquisitionLayout {
    /// Build the layout of `frame` from the fixed group table
    pub fn build(frame: &NeuroFrame) -> AcqResult<Self> {
        Self::build_with(&GROUP_TABLE, frame)
    }

    pub fn build_with(table: &[GroupBinding], frame: &NeuroFrame) -> AcqResult<Self> {
        let mut strides: Vec<Option<usize>> = vec![None; table.len()];
        let mut descriptors = Vec::with_capacity(table.len());

        for binding in table {
            if descriptors.iter().any(|d: &LayoutDescriptor| d.kind == binding.kind) {
                return Err(AcqError::Layout(format!("{} group bound twice", binding.kind)));
            }
            let slot = strides.get_mut(binding.buffer_index).ok_or_else(|| {
                AcqError::Layout(format!(
                    "{} group bound to buffer {} of {}",
                    binding.kind,
                    binding.buffer_index,
                    table.len()
                ))
            })?;
            if slot.is_some() {
                return Err(AcqError::Layout(format!("buffer {} bound twice", binding.buffer_index)));
            }

            let shape = frame.shape(binding.kind);
            if shape.encoding != binding.encoding {
                return Err(AcqError::Layout(format!(
                    "{} group stores {:?} samples, table asks for {:?}",
                    binding.kind, shape.encoding, binding.encoding
                )));
            }

            *slot = Some(shape.stride);
            descriptors.push(LayoutDescriptor {
                kind: binding.kind,
                buffer_index: binding.buffer_index,
                offset: 0,
                encoding: binding.encoding,
                channel_count: shape.channels,
            });
        }

        // Every slot is filled: each binding took a distinct in-range index.
        let strides = strides.into_iter().map(|s| s.unwrap_or_default()).collect();
        Ok(Self { descriptors, strides })
    }

    pub fn descriptors(&self) -> &[LayoutDescriptor] {
        &self.descriptors
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn descriptor(&self, kind: GroupKind) -> Option<&LayoutDescriptor> {
        self.descriptors.iter().find(|d| d.kind == kind)
    }

    /// Destination buffers of `frame`, ordered by buffer index
    pub fn arrange<'f>(&self, frame: &'f mut NeuroFrame) -> AcqResult<Vec<DestinationBuffer<'f>>> {
        let mut slots: Vec<Option<DestinationBuffer<'f>>> = (0..self.strides.len()).map(|_| None).collect();
        for (kind, buffer) in frame.destinations() {
            if let Some(descriptor) = self.descriptor(kind) {
                slots[descriptor.buffer_index] = Some(buffer);
            }
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or_else(|| AcqError::Layout(format!("no group bound to buffer {}", index))))
            .collect()
    }
}
