// tests/lifecycle_integration.rs
//! End-to-end lifecycle tests through the simulated device layer

use egd_acquisition::config::constants::keys;
use egd_acquisition::hal::simulator::{Pacing, SimulatorConfig, SimulatorLayer, SimulatorProbe};
use egd_acquisition::{
    AcquisitionConfig, Device, EgdAcquisition, GroupKind, LifecycleState, MemoryParameters, NeuroFrame,
};

fn unpaced(config: SimulatorConfig) -> SimulatorLayer {
    SimulatorLayer::new(SimulatorConfig {
        pacing: Pacing::Unpaced,
        ..config
    })
}

fn acquisition(layer: SimulatorLayer, params: MemoryParameters) -> (EgdAcquisition, SimulatorProbe) {
    let probe = layer.probe();
    (EgdAcquisition::new(Box::new(layer), Box::new(params)), probe)
}

#[test]
fn test_recorded_file_session() {
    let layer = unpaced(SimulatorConfig {
        recording_samples: 80,
        ..Default::default()
    });
    let params = MemoryParameters::new()
        .with_string(keys::DEVARG, "session.bdf")
        .with_integer(keys::SAMPLERATE, 0)
        .with_string(keys::DEVEXT, "");
    let (mut acq, probe) = acquisition(layer, params);

    assert!(acq.configure(NeuroFrame::new(), 16));
    assert!(acq.open());
    assert_eq!(probe.last_selector().as_deref(), Some("datafile|path|session.bdf"));
    assert!(acq.setup());
    assert_eq!(acq.device_info().id, "session.bdf");
    assert!(acq.start());

    // 80 samples at 32 per cycle: two full reads, then a short one
    assert_eq!(acq.get(), Some(32));
    assert_eq!(acq.get(), Some(32));
    assert_eq!(acq.get(), Some(16));
    assert_eq!(acq.get(), Some(0));
    assert!(acq.stop());
    assert!(acq.close());
}

#[test]
fn test_hardware_selector_and_frame_contents() {
    let layer = unpaced(SimulatorConfig {
        eeg_channels: 8,
        sensor_channels: 2,
        trigger_channels: 1,
        trigger_period_samples: 8,
        ..Default::default()
    });
    let params = MemoryParameters::new()
        .with_string(keys::DEVARG, "gtec")
        .with_integer(keys::SAMPLERATE, 512);
    let (mut acq, probe) = acquisition(layer, params);

    assert!(acq.configure(NeuroFrame::new(), 16));
    assert!(acq.open());
    assert_eq!(probe.last_selector().as_deref(), Some("gtec|samplerate|512"));
    assert!(acq.setup());
    assert!(acq.start());
    assert_eq!(acq.get(), Some(32));

    let frame = acq.frame();
    assert_eq!(frame.eeg.samples().dim(), (32, 8));
    assert_eq!(frame.exg.samples().dim(), (32, 2));
    assert!(frame.eeg.data().iter().all(|v| v.is_finite()));

    let trigger = frame.tri.channel(0).unwrap();
    let fired: Vec<_> = trigger.iter().enumerate().filter(|(_, v)| **v != 0).map(|(i, _)| i).collect();
    assert_eq!(fired, vec![0, 8, 16, 24]);

    let eeg = frame.metadata(GroupKind::Signal);
    assert_eq!(eeg.labels.len(), 8);
    assert_eq!(eeg.labels[0], "Fp1");
    assert!(frame.metadata(GroupKind::Trigger).is_integer);
}

#[test]
fn test_installed_layout_matches_frame() {
    let layer = unpaced(SimulatorConfig::default());
    let params = MemoryParameters::new().with_string(keys::DEVARG, "eego");
    let (mut acq, probe) = acquisition(layer, params);

    acq.try_configure(NeuroFrame::new(), 32).unwrap();
    acq.try_open().unwrap();
    acq.try_setup().unwrap();

    let layout = acq.layout().unwrap();
    let installed = probe.snapshot();
    assert_eq!(installed.groups, layout.descriptors());
    assert_eq!(installed.strides, layout.strides());

    let mut indices: Vec<_> = layout.descriptors().iter().map(|d| d.buffer_index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2]);

    for descriptor in layout.descriptors() {
        let shape = acq.frame().shape(descriptor.kind);
        assert_eq!(descriptor.channel_count, shape.channels);
        assert_eq!(layout.strides()[descriptor.buffer_index], shape.stride);
        assert_eq!(shape.samples, 16);
        assert_eq!(acq.frame().metadata(descriptor.kind).labels.len(), shape.channels);
    }
}

#[test]
fn test_restart_after_stop() {
    let layer = unpaced(SimulatorConfig::default());
    let params = MemoryParameters::new().with_string(keys::DEVARG, "gtec");
    let (mut acq, probe) = acquisition(layer, params);

    acq.try_configure(NeuroFrame::new(), 16).unwrap();
    acq.try_open().unwrap();
    acq.try_setup().unwrap();
    for _ in 0..3 {
        acq.try_start().unwrap();
        assert_eq!(acq.try_get().unwrap(), 32);
        acq.try_stop().unwrap();
    }
    assert_eq!(acq.state(), LifecycleState::Stopped);

    // A stopped device may be set up again before restarting
    acq.try_setup().unwrap();
    assert_eq!(acq.state(), LifecycleState::Ready);
    assert_eq!(probe.snapshot().acq_setups, 2);
}

#[test]
fn test_reopen_after_close() {
    let layer = unpaced(SimulatorConfig::default());
    let params = MemoryParameters::new().with_string(keys::DEVARG, "gtec");
    let (mut acq, probe) = acquisition(layer, params);

    assert!(acq.close());
    assert!(acq.configure(NeuroFrame::new(), 16));
    assert!(acq.open());
    assert!(acq.setup());
    assert!(acq.close());
    assert!(acq.layout().is_none());

    assert!(acq.open());
    assert!(acq.setup());
    assert!(acq.close());

    let state = probe.snapshot();
    assert_eq!(state.selectors.len(), 2);
    assert_eq!(state.closes, 2);
    assert_eq!(state.open_devices, 0);
}

#[test]
fn test_configuration_drives_acquisition() {
    let config: AcquisitionConfig = toml::from_str(
        r#"
framerate = 8

[device]
devarg = "neurosky"
samplerate = 128

[selector.samplerate_options]
neurosky = "fs"

[simulator]
pacing = "unpaced"
eeg_channels = 2
sensor_channels = 0
trigger_channels = 1
"#,
    )
    .unwrap();
    assert!(config.validate_consistency().is_ok());

    let layer = SimulatorLayer::new(config.simulator.clone().unwrap_or_default());
    let probe = layer.probe();
    let mut acq = EgdAcquisition::new(Box::new(layer), Box::new(config.device.clone()))
        .with_selector_rules(config.selector.clone());

    assert!(acq.configure(NeuroFrame::new(), config.framerate));
    assert!(acq.open());
    // "fs" is not a rate option the simulator understands, so it keeps 512 Hz
    assert_eq!(probe.last_selector().as_deref(), Some("neurosky|fs|128"));
    assert!(acq.setup());
    assert_eq!(acq.samples_per_cycle(), 64);
    assert_eq!(acq.frame().exg.nchannels(), 0);
    assert!(acq.frame().metadata(GroupKind::Auxiliary).labels.is_empty());

    assert!(acq.start());
    assert_eq!(acq.get(), Some(64));
}
