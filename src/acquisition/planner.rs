// src/acquisition/planner.rs
//! Frame layout planning
//!
//! Planning queries the native rate and the channel count of every group,
//! derives the number of samples pulled per cycle and builds the metadata of
//! each group. The resulting [`FramePlan`] is computed without touching the
//! frame; [`FramePlan::apply`] then reserves storage in one step.

use crate::acquisition::capability::CapabilityQuery;
use crate::acquisition::metadata::build_metadata;
use crate::config::constants::device::GROUP_COUNT;
use crate::error::{AcqError, AcqResult};
use crate::frame::{ChannelMetadata, NeuroFrame};
use crate::hal::GroupKind;
use tracing::debug;

/// Samples pulled per cycle: `floor(native_rate / framerate)`.
///
/// The remainder of a non-divisible rate is dropped.
pub fn samples_per_cycle(native_rate: u32, framerate: u32) -> AcqResult<usize> {
    if framerate == 0 {
        return Err(AcqError::Layout("framerate must be greater than 0".to_string()));
    }
    if framerate > native_rate {
        return Err(AcqError::Layout(format!(
            "framerate {} Hz exceeds the native sampling rate {} Hz",
            framerate, native_rate
        )));
    }
    Ok((native_rate / framerate) as usize)
}

/// Planned layout of one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlan {
    pub kind: GroupKind,
    pub channels: usize,
    pub metadata: ChannelMetadata,
}

/// Planned layout of a whole frame
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub sample_rate: u32,
    pub samples_per_cycle: usize,
    pub groups: Vec<GroupPlan>,
}

impl FramePlan {
    pub fn discover(query: &CapabilityQuery<'_>, framerate: u32) -> AcqResult<Self> {
        let sample_rate = query.sample_rate()?;
        let samples_per_cycle = samples_per_cycle(sample_rate, framerate)?;

        let mut groups = Vec::with_capacity(GROUP_COUNT);
        for kind in GroupKind::ALL {
            let channels = query.channel_count(kind)?;
            let metadata = build_metadata(query, kind, channels)?;
            debug!(group = %kind, channels, samples = samples_per_cycle, "group planned");
            groups.push(GroupPlan {
                kind,
                channels,
                metadata,
            });
        }

        Ok(Self {
            sample_rate,
            samples_per_cycle,
            groups,
        })
    }

    pub fn group(&self, kind: GroupKind) -> Option<&GroupPlan> {
        self.groups.iter().find(|group| group.kind == kind)
    }

    /// Reserve storage and replace the metadata of every planned group
    pub fn apply(self, frame: &mut NeuroFrame) {
        frame.sample_rate = self.sample_rate;
        for group in self.groups {
            frame.reserve(group.kind, self.samples_per_cycle, group.channels);
            *frame.metadata_mut(group.kind) = group.metadata;
        }
    }
}
