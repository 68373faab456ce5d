// src/hal/simulator.rs
//! Simulated eegdev device layer
//!
//! Opens hardware-style selectors (`gtec|samplerate|512`) as well as recorded
//! file selectors (`datafile|path|run.bdf`) and produces synthetic EEG,
//! sensor and trigger channels. Recorded sources are finite and end with a
//! short read. A shared [`SimulatorProbe`] records every call reaching the
//! layer, and a [`FaultPlan`] makes any vendor call fail on demand.

use crate::config::constants::selector::{DATAFILE_PREFIX, SEPARATOR};
use crate::hal::traits::{DeviceLayer, EgdDevice};
use crate::hal::types::{
    errno, Capability, CapabilityValue, ChannelInfo, DestinationBuffer, GroupKind, LayoutDescriptor,
    VendorError,
};
use crate::utils::time::{duration_of, samples_in, MonotonicTimeProvider, TimeProvider};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Electrode labels handed out to the first EEG channels
const EEG_LABELS: &[&str] = &[
    "Fp1", "Fp2", "F7", "F3", "Fz", "F4", "F8", "T7", "C3", "Cz", "C4", "T8", "P7", "P3", "Pz", "P4",
    "P8", "O1", "Oz", "O2",
];

/// Selector options understood as a sample-rate request
const SAMPLERATE_KEYS: &[&str] = &["samplerate", "SR"];
const DEVICE_ID_KEY: &str = "deviceid";

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub model: String,
    pub device_id: String,
    /// Native sampling rate, overridden by a rate given in the selector
    pub sampling_rate_hz: u32,
    pub eeg_channels: usize,
    pub sensor_channels: usize,
    pub trigger_channels: usize,
    /// Peak EEG amplitude [uV]
    pub signal_amplitude: f32,
    /// Noise level relative to the amplitude, 0.0 to 1.0
    pub noise_level: f32,
    pub pattern: ActivationPattern,
    /// A trigger fires every this many samples, 0 disables triggers
    pub trigger_period_samples: u32,
    /// Length of recorded-file sources in samples
    pub recording_samples: u64,
    pub pacing: Pacing,
    pub seed: u64,
    #[serde(skip)]
    pub faults: FaultPlan,
}

/// Shape of the synthetic EEG rhythm
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ActivationPattern {
    Constant,
    Sinusoidal { frequency_hz: f32 },
    Burst { burst_duration_ms: u32, rest_duration_ms: u32 },
    Ramp { ramp_duration_ms: u32 },
    Random,
}

/// How reads are paced against the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Reads block until the samples would have been produced
    Realtime,
    /// Reads return immediately
    Unpaced,
}

/// Vendor calls forced to fail
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultPlan {
    pub fail_open: bool,
    pub fail_capability: Option<Capability>,
    pub fail_channel_count: Option<GroupKind>,
    pub fail_channel_info: Option<(GroupKind, usize)>,
    pub fail_acq_setup: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub fail_close: bool,
    /// Reads fail once this many samples have been delivered
    pub fail_read_after: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            model: "EGD Simulator".to_string(),
            device_id: "SIM-0001".to_string(),
            sampling_rate_hz: 512,
            eeg_channels: 16,
            sensor_channels: 3,
            trigger_channels: 1,
            signal_amplitude: 50.0,
            noise_level: 0.1,
            pattern: ActivationPattern::Sinusoidal { frequency_hz: 10.0 },
            trigger_period_samples: 512,
            recording_samples: 5120,
            pacing: Pacing::Realtime,
            seed: 0x5eed,
            faults: FaultPlan::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), VendorError> {
        if self.sampling_rate_hz == 0 {
            return Err(VendorError::new(errno::EINVAL, "sampling rate must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.noise_level) {
            return Err(VendorError::new(
                errno::EINVAL,
                format!("noise level {} outside 0.0..=1.0", self.noise_level),
            ));
        }
        Ok(())
    }

    fn channel_count(&self, kind: GroupKind) -> usize {
        match kind {
            GroupKind::Signal => self.eeg_channels,
            GroupKind::Auxiliary => self.sensor_channels,
            GroupKind::Trigger => self.trigger_channels,
        }
    }
}

/// Calls observed by the simulator, shared between the layer and its devices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeState {
    pub selectors: Vec<String>,
    pub acq_setups: usize,
    pub strides: Vec<usize>,
    pub groups: Vec<LayoutDescriptor>,
    pub starts: usize,
    pub stops: usize,
    pub closes: usize,
    pub open_devices: usize,
}

/// Handle for inspecting what reached the simulator
#[derive(Debug, Clone, Default)]
pub struct SimulatorProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl SimulatorProbe {
    pub fn snapshot(&self) -> ProbeState {
        self.state.lock().clone()
    }

    /// Selector of the most recent open
    pub fn last_selector(&self) -> Option<String> {
        self.state.lock().selectors.last().cloned()
    }

    fn update(&self, f: impl FnOnce(&mut ProbeState)) {
        f(&mut self.state.lock());
    }
}

/// Device layer producing [`SimulatedDevice`]s
pub struct SimulatorLayer {
    config: SimulatorConfig,
    clock: Arc<dyn TimeProvider>,
    probe: SimulatorProbe,
}

impl SimulatorLayer {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            clock: Arc::new(MonotonicTimeProvider::new()),
            probe: SimulatorProbe::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    pub fn probe(&self) -> SimulatorProbe {
        self.probe.clone()
    }
}

impl Default for SimulatorLayer {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Hardware { vendor: String },
    Recording { path: String },
}

#[derive(Debug, Clone, PartialEq)]
struct SelectorRequest {
    source: Source,
    samplerate: Option<u32>,
    device_id: Option<String>,
}

fn parse_selector(selector: &str) -> Result<SelectorRequest, VendorError> {
    let (source, options) = match selector.strip_prefix(DATAFILE_PREFIX) {
        Some(rest) => {
            let mut tokens = rest.split(SEPARATOR);
            let path = tokens.next().unwrap_or_default();
            if path.is_empty() {
                return Err(VendorError::new(errno::ENOENT, "datafile selector without a path"));
            }
            (Source::Recording { path: path.to_string() }, tokens.collect::<Vec<_>>())
        }
        None => {
            let mut tokens = selector.split(SEPARATOR);
            let vendor = tokens.next().unwrap_or_default();
            if vendor.is_empty() {
                return Err(VendorError::new(errno::ENODEV, "empty device selector"));
            }
            (Source::Hardware { vendor: vendor.to_string() }, tokens.collect::<Vec<_>>())
        }
    };

    let mut request = SelectorRequest {
        source,
        samplerate: None,
        device_id: None,
    };

    for pair in options.chunks(2) {
        let (key, value) = match pair {
            [key, value] => (*key, *value),
            [key] => (*key, ""),
            _ => continue,
        };
        if SAMPLERATE_KEYS.contains(&key) {
            let rate = value
                .parse::<u32>()
                .map_err(|_| VendorError::new(errno::EINVAL, format!("invalid sample rate '{}'", value)))?;
            request.samplerate = Some(rate).filter(|rate| *rate > 0);
        } else if key == DEVICE_ID_KEY {
            request.device_id = Some(value.to_string());
        }
    }

    Ok(request)
}

impl DeviceLayer for SimulatorLayer {
    fn open(&self, selector: &str) -> Result<Box<dyn EgdDevice>, VendorError> {
        self.probe.update(|state| state.selectors.push(selector.to_string()));

        if self.config.faults.fail_open {
            return Err(VendorError::new(errno::ENODEV, "simulated device unavailable"));
        }
        self.config.validate()?;
        let request = parse_selector(selector)?;

        let mut config = self.config.clone();
        if let Some(rate) = request.samplerate {
            config.sampling_rate_hz = rate;
        }
        match &request.source {
            Source::Recording { path } => config.device_id = path.clone(),
            Source::Hardware { vendor } => config.model = format!("{} ({})", config.model, vendor),
        }
        if let Some(id) = request.device_id {
            config.device_id = id;
        }

        tracing::debug!(selector, rate = config.sampling_rate_hz, "simulated device opened");
        self.probe.update(|state| state.open_devices += 1);

        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Box::new(SimulatedDevice {
            config,
            source: request.source,
            clock: Arc::clone(&self.clock),
            probe: self.probe.clone(),
            rng,
            strides: Vec::new(),
            groups: None,
            running: false,
            delivered: 0,
            anchor_nanos: 0,
            anchor_samples: 0,
        }))
    }
}

/// One open simulated connection
pub struct SimulatedDevice {
    config: SimulatorConfig,
    source: Source,
    clock: Arc<dyn TimeProvider>,
    probe: SimulatorProbe,
    rng: StdRng,
    strides: Vec<usize>,
    groups: Option<Vec<LayoutDescriptor>>,
    running: bool,
    /// Samples delivered since open
    delivered: u64,
    anchor_nanos: u64,
    anchor_samples: u64,
}

impl SimulatedDevice {
    fn remaining(&self) -> Option<u64> {
        match self.source {
            Source::Recording { .. } => Some(self.config.recording_samples.saturating_sub(self.delivered)),
            Source::Hardware { .. } => None,
        }
    }

    /// Samples produced by the clock and not yet read
    fn produced_unread(&self) -> u64 {
        let elapsed = self.clock.now_nanos().saturating_sub(self.anchor_nanos);
        let produced = self.anchor_samples + samples_in(elapsed, self.config.sampling_rate_hz);
        produced.saturating_sub(self.delivered)
    }

    fn wait_for(&self, count: u64) {
        if self.config.pacing == Pacing::Unpaced {
            return;
        }
        let target = self.delivered + count - self.anchor_samples;
        let due = duration_of(target, self.config.sampling_rate_hz);
        let elapsed = self.clock.now_nanos().saturating_sub(self.anchor_nanos);
        if let Some(wait) = due.checked_sub(std::time::Duration::from_nanos(elapsed)) {
            std::thread::sleep(wait);
        }
    }

    fn signal_value(&mut self, channel: usize, sample: u64) -> f64 {
        let amplitude = self.config.signal_amplitude as f64;
        let t = sample as f64 / self.config.sampling_rate_hz as f64;
        let phase_offset = channel as f64 * std::f64::consts::PI / 8.0;

        let base = match &self.config.pattern {
            ActivationPattern::Constant => amplitude,
            ActivationPattern::Sinusoidal { frequency_hz } => {
                amplitude * (2.0 * std::f64::consts::PI * *frequency_hz as f64 * t + phase_offset).sin()
            }
            ActivationPattern::Burst {
                burst_duration_ms,
                rest_duration_ms,
            } => {
                let period_ms = (*burst_duration_ms + *rest_duration_ms).max(1) as f64;
                if (t * 1000.0) % period_ms < *burst_duration_ms as f64 {
                    amplitude
                } else {
                    0.0
                }
            }
            ActivationPattern::Ramp { ramp_duration_ms } => {
                let period = (*ramp_duration_ms).max(1) as f64 / 1000.0;
                amplitude * ((t % period) / period)
            }
            ActivationPattern::Random => amplitude * self.rng.gen_range(-1.0..=1.0),
        };

        let noise_level = self.config.noise_level as f64;
        if noise_level > 0.0 {
            base + self.rng.gen_range(-1.0..=1.0) * noise_level * amplitude
        } else {
            base
        }
    }

    fn sample_value(&mut self, kind: GroupKind, channel: usize, sample: u64) -> f64 {
        match kind {
            GroupKind::Signal => self.signal_value(channel, sample),
            GroupKind::Auxiliary => {
                let t = sample as f64 / self.config.sampling_rate_hz as f64;
                (2.0 * std::f64::consts::PI * (channel + 1) as f64 * t).sin()
            }
            GroupKind::Trigger => {
                let period = self.config.trigger_period_samples as u64;
                if period > 0 && sample % period == 0 {
                    (channel + 1) as f64
                } else {
                    0.0
                }
            }
        }
    }

    fn check_capacity(
        &self,
        groups: &[LayoutDescriptor],
        count: usize,
        buffers: &[DestinationBuffer<'_>],
    ) -> Result<(), VendorError> {
        for group in groups.iter().filter(|g| g.channel_count > 0) {
            let buffer = buffers.get(group.buffer_index).ok_or_else(|| {
                VendorError::new(errno::EINVAL, format!("missing destination buffer {}", group.buffer_index))
            })?;
            let stride = self.strides[group.buffer_index];
            let needed = (count - 1) * stride + group.offset + group.channel_count * group.encoding.size();
            if needed > buffer.len_bytes() {
                return Err(VendorError::new(
                    errno::EFAULT,
                    format!(
                        "{} samples of {} need {} bytes, buffer holds {}",
                        count,
                        group.kind,
                        needed,
                        buffer.len_bytes()
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl EgdDevice for SimulatedDevice {
    fn get_cap(&self, cap: Capability) -> Result<CapabilityValue, VendorError> {
        if self.config.faults.fail_capability == Some(cap) {
            return Err(VendorError::from_errno(errno::EIO));
        }
        Ok(match cap {
            Capability::DeviceType => CapabilityValue::Text(self.config.model.clone()),
            Capability::DeviceId => CapabilityValue::Text(self.config.device_id.clone()),
            Capability::SampleRate => CapabilityValue::Rate(self.config.sampling_rate_hz),
        })
    }

    fn get_numch(&self, kind: GroupKind) -> Result<usize, VendorError> {
        if self.config.faults.fail_channel_count == Some(kind) {
            return Err(VendorError::from_errno(errno::EIO));
        }
        Ok(self.config.channel_count(kind))
    }

    fn channel_info(&self, kind: GroupKind, index: usize) -> Result<ChannelInfo, VendorError> {
        if self.config.faults.fail_channel_info == Some((kind, index)) {
            return Err(VendorError::from_errno(errno::EIO));
        }
        if index >= self.config.channel_count(kind) {
            return Err(VendorError::new(
                errno::EINVAL,
                format!("no {} channel {}", kind, index),
            ));
        }

        let amplitude = self.config.signal_amplitude as f64;
        let info = match kind {
            GroupKind::Signal => ChannelInfo {
                unit: "uV".to_string(),
                transducer: "Active Electrode".to_string(),
                prefiltering: format!("HP: 0.1Hz; LP: {}Hz", self.config.sampling_rate_hz / 4),
                calibration_range: [-amplitude * 4.0, amplitude * 4.0],
                is_integer: false,
                label: EEG_LABELS
                    .get(index)
                    .map(|label| label.to_string())
                    .unwrap_or_else(|| format!("EEG{}", index + 1)),
            },
            GroupKind::Auxiliary => ChannelInfo {
                unit: "mV".to_string(),
                transducer: "Sensor".to_string(),
                prefiltering: "None".to_string(),
                calibration_range: [-1.0, 1.0],
                is_integer: false,
                label: format!("EXG{}", index + 1),
            },
            GroupKind::Trigger => ChannelInfo {
                unit: "Boolean".to_string(),
                transducer: "Triggers and Status".to_string(),
                prefiltering: "No filtering".to_string(),
                calibration_range: [-8_388_608.0, 8_388_607.0],
                is_integer: true,
                label: if index == 0 {
                    "Status".to_string()
                } else {
                    format!("TRI{}", index + 1)
                },
            },
        };
        Ok(info)
    }

    fn acq_setup(&mut self, strides: &[usize], groups: &[LayoutDescriptor]) -> Result<(), VendorError> {
        if self.config.faults.fail_acq_setup {
            return Err(VendorError::from_errno(errno::EIO));
        }
        if self.running {
            return Err(VendorError::new(errno::EPERM, "acquisition running"));
        }

        for group in groups {
            let stride = *strides.get(group.buffer_index).ok_or_else(|| {
                VendorError::new(errno::EINVAL, format!("no stride for buffer {}", group.buffer_index))
            })?;
            let available = self.config.channel_count(group.kind);
            if group.channel_count != available {
                return Err(VendorError::new(
                    errno::EINVAL,
                    format!("{} group asks for {} channels, device has {}", group.kind, group.channel_count, available),
                ));
            }
            let size = group.encoding.size();
            if group.offset % size != 0 || stride % size != 0 {
                return Err(VendorError::new(errno::EINVAL, format!("misaligned {} group", group.kind)));
            }
            if group.channel_count > 0 && group.offset + group.channel_count * size > stride {
                return Err(VendorError::new(
                    errno::EINVAL,
                    format!("{} group does not fit a {} byte stride", group.kind, stride),
                ));
            }
        }

        self.strides = strides.to_vec();
        self.groups = Some(groups.to_vec());
        self.probe.update(|state| {
            state.acq_setups += 1;
            state.strides = strides.to_vec();
            state.groups = groups.to_vec();
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), VendorError> {
        if self.groups.is_none() {
            return Err(VendorError::new(errno::EPERM, "acquisition not set up"));
        }
        if self.config.faults.fail_start {
            return Err(VendorError::from_errno(errno::EIO));
        }
        self.running = true;
        self.anchor_nanos = self.clock.now_nanos();
        self.anchor_samples = self.delivered;
        self.probe.update(|state| state.starts += 1);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), VendorError> {
        if !self.running {
            return Err(VendorError::new(errno::EPERM, "acquisition not running"));
        }
        if self.config.faults.fail_stop {
            return Err(VendorError::from_errno(errno::EIO));
        }
        self.running = false;
        self.probe.update(|state| state.stops += 1);
        Ok(())
    }

    fn get_data(&mut self, ns: usize, buffers: &mut [DestinationBuffer<'_>]) -> Result<usize, VendorError> {
        if !self.running {
            return Err(VendorError::new(errno::EPERM, "acquisition not running"));
        }
        if let Some(limit) = self.config.faults.fail_read_after {
            if self.delivered >= limit {
                return Err(VendorError::from_errno(errno::EIO));
            }
        }

        let count = match self.remaining() {
            Some(left) => ns.min(left as usize),
            None => ns,
        };
        if count == 0 {
            return Ok(0);
        }

        let groups = self.groups.clone().unwrap_or_default();
        self.check_capacity(&groups, count, buffers)?;
        self.wait_for(count as u64);

        for s in 0..count {
            let sample = self.delivered + s as u64;
            for group in &groups {
                let stride = self.strides[group.buffer_index];
                let size = group.encoding.size();
                for channel in 0..group.channel_count {
                    let value = self.sample_value(group.kind, channel, sample);
                    let offset = s * stride + group.offset + channel * size;
                    buffers[group.buffer_index].write(group.encoding, offset, value)?;
                }
            }
        }

        self.delivered += count as u64;
        Ok(count)
    }

    fn get_available(&self) -> Result<usize, VendorError> {
        if !self.running {
            return Ok(0);
        }
        let ready = match self.config.pacing {
            Pacing::Realtime => self.produced_unread(),
            Pacing::Unpaced => self.config.sampling_rate_hz as u64,
        };
        let ready = self.remaining().map_or(ready, |left| ready.min(left));
        Ok(ready as usize)
    }

    fn close(self: Box<Self>) -> Result<(), VendorError> {
        self.probe.update(|state| {
            state.closes += 1;
            state.open_devices = state.open_devices.saturating_sub(1);
        });
        if self.config.faults.fail_close {
            return Err(VendorError::from_errno(errno::EIO));
        }
        Ok(())
    }
}
