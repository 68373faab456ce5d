// src/acquisition/metadata.rs
//! Normalized per-group channel metadata

use crate::acquisition::capability::CapabilityQuery;
use crate::error::{AcqError, AcqResult};
use crate::frame::ChannelMetadata;
use crate::hal::GroupKind;

/// Build the metadata of one group.
///
/// Group-level fields are read from channel 0, on the assumption that all
/// channels of a group share unit, transducer, filtering and calibration.
/// Labels are then read one channel at a time, in order. A group without
/// channels issues no query and gets the default metadata.
pub fn build_metadata(query: &CapabilityQuery<'_>, kind: GroupKind, channel_count: usize) -> AcqResult<ChannelMetadata> {
    if channel_count == 0 {
        return Ok(ChannelMetadata::default());
    }

    let representative = query.channel_info(kind, 0)?;
    let mut labels = Vec::with_capacity(channel_count);
    for channel in 0..channel_count {
        labels.push(query.channel_info(kind, channel)?.label);
    }

    let metadata = ChannelMetadata {
        unit: representative.unit,
        transducer: representative.transducer,
        prefiltering: representative.prefiltering,
        calibration_range: representative.calibration_range,
        is_integer: representative.is_integer,
        labels,
    };
    check_labels(&metadata, kind, channel_count)?;
    Ok(metadata)
}

/// Label count must match the channel count of the group
pub fn check_labels(metadata: &ChannelMetadata, kind: GroupKind, channel_count: usize) -> AcqResult<()> {
    if metadata.labels.len() != channel_count {
        return Err(AcqError::Layout(format!(
            "{} group has {} labels for {} channels",
            kind,
            metadata.labels.len(),
            channel_count
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapabilityField;
    use crate::hal::simulator::{FaultPlan, Pacing, SimulatorConfig, SimulatorLayer};
    use crate::hal::{DeviceLayer, EgdDevice};

    fn open(config: SimulatorConfig) -> Box<dyn EgdDevice> {
        SimulatorLayer::new(SimulatorConfig {
            pacing: Pacing::Unpaced,
            ..config
        })
        .open("gtec")
        .unwrap()
    }

    #[test]
    fn test_group_fields_from_first_channel() {
        let device = open(SimulatorConfig {
            eeg_channels: 4,
            ..Default::default()
        });
        let query = CapabilityQuery::new(device.as_ref());

        let metadata = build_metadata(&query, GroupKind::Signal, 4).unwrap();
        assert_eq!(metadata.unit, "uV");
        assert!(!metadata.is_integer);
        assert_eq!(metadata.labels, vec!["Fp1", "Fp2", "F7", "F3"]);

        let trigger = build_metadata(&query, GroupKind::Trigger, 1).unwrap();
        assert!(trigger.is_integer);
        assert_eq!(trigger.labels, vec!["Status"]);
    }

    #[test]
    fn test_empty_group_issues_no_query() {
        let device = open(SimulatorConfig {
            sensor_channels: 0,
            faults: FaultPlan {
                fail_channel_info: Some((GroupKind::Auxiliary, 0)),
                ..Default::default()
            },
            ..Default::default()
        });
        let query = CapabilityQuery::new(device.as_ref());

        let metadata = build_metadata(&query, GroupKind::Auxiliary, 0).unwrap();
        assert_eq!(metadata, ChannelMetadata::default());
    }

    #[test]
    fn test_label_failure_aborts() {
        let device = open(SimulatorConfig {
            eeg_channels: 8,
            faults: FaultPlan {
                fail_channel_info: Some((GroupKind::Signal, 5)),
                ..Default::default()
            },
            ..Default::default()
        });
        let query = CapabilityQuery::new(device.as_ref());

        let err = build_metadata(&query, GroupKind::Signal, 8).unwrap_err();
        assert!(matches!(
            err,
            AcqError::Capability {
                field: CapabilityField::ChannelInfo { channel: 5, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_label_count_checked() {
        let metadata = ChannelMetadata {
            labels: vec!["A1".to_string()],
            ..Default::default()
        };
        assert!(check_labels(&metadata, GroupKind::Auxiliary, 1).is_ok());
        assert!(matches!(check_labels(&metadata, GroupKind::Auxiliary, 2), Err(AcqError::Layout(_))));
    }
}
