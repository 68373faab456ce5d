// src/acquisition/controller.rs
//! Lifecycle controller of an eegdev acquisition device
//!
//! The controller owns the device handle, the frame and the installed
//! layout. Operations must follow the lifecycle
//! `configure -> open -> setup -> start -> get... -> stop -> close`;
//! calls made out of order fail with [`AcqError::InvalidState`].
//!
//! `setup` is all-or-nothing: the previous layout is released first, the new
//! one is only kept once the device accepted it, and any failure leaves the
//! controller `Open` so setup can be retried from scratch.

use crate::acquisition::capability::CapabilityQuery;
use crate::acquisition::layout::AcquisitionLayout;
use crate::acquisition::planner::FramePlan;
use crate::acquisition::selector::SelectorRules;
use crate::acquisition::LifecycleState;
use crate::config::constants::device::DEVICE_NAME;
use crate::config::{DeviceConfig, ParameterSource};
use crate::error::{AcqError, AcqResult, SetupStep};
use crate::frame::NeuroFrame;
use crate::hal::{DeviceIdentity, DeviceLayer, EgdDevice};
use tracing::{debug, info, trace, warn};

/// Acquisition device driven through an eegdev-style device layer
pub struct EgdAcquisition {
    layer: Box<dyn DeviceLayer>,
    params: Box<dyn ParameterSource>,
    rules: SelectorRules,
    state: LifecycleState,
    config: Option<DeviceConfig>,
    frame: NeuroFrame,
    device: Option<Box<dyn EgdDevice>>,
    layout: Option<AcquisitionLayout>,
    identity: DeviceIdentity,
    samples_per_cycle: usize,
}

impl EgdAcquisition {
    pub fn new(layer: Box<dyn DeviceLayer>, params: Box<dyn ParameterSource>) -> Self {
        Self {
            layer,
            params,
            rules: SelectorRules::default(),
            state: LifecycleState::Unconfigured,
            config: None,
            frame: NeuroFrame::new(),
            device: None,
            layout: None,
            identity: DeviceIdentity::default(),
            samples_per_cycle: 0,
        }
    }

    pub fn with_selector_rules(mut self, rules: SelectorRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn name(&self) -> &'static str {
        DEVICE_NAME
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref()
    }

    pub fn frame(&self) -> &NeuroFrame {
        &self.frame
    }

    /// Layout installed on the device by the last successful setup
    pub fn layout(&self) -> Option<&AcquisitionLayout> {
        self.layout.as_ref()
    }

    pub fn samples_per_cycle(&self) -> usize {
        self.samples_per_cycle
    }

    pub fn device_info(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Selector `open` hands to the device layer
    pub fn selector(&self) -> Option<String> {
        self.config.as_ref().map(|config| self.rules.selector_for(config))
    }

    /// Read the device parameters and adopt `frame`.
    ///
    /// Reconfiguring replaces the previous configuration; a failure leaves it
    /// untouched.
    pub fn try_configure(&mut self, frame: NeuroFrame, framerate: u32) -> AcqResult<()> {
        self.expect_state("configure", &[LifecycleState::Unconfigured, LifecycleState::Configured])?;

        let config = DeviceConfig::from_params(self.params.as_ref(), framerate)?;
        debug!(
            device = DEVICE_NAME,
            devarg = %config.devarg,
            devext = %config.devext,
            samplerate = config.samplerate,
            framerate,
            "device parameters read"
        );

        self.config = Some(config);
        self.frame = frame;
        self.state = LifecycleState::Configured;
        Ok(())
    }

    pub fn try_open(&mut self) -> AcqResult<()> {
        self.expect_state("open", &[LifecycleState::Configured])?;
        let selector = self.selector().ok_or(AcqError::InvalidState {
            operation: "open",
            state: self.state,
        })?;

        let device = self.layer.open(&selector).map_err(|source| AcqError::Open {
            selector: selector.clone(),
            source,
        })?;

        info!(device = DEVICE_NAME, selector = %selector, "device correctly opened with arg={}", selector);
        self.device = Some(device);
        self.state = LifecycleState::Open;
        Ok(())
    }

    /// Discover capabilities, plan the frame and install the acquisition groups
    pub fn try_setup(&mut self) -> AcqResult<()> {
        self.expect_state(
            "setup",
            &[LifecycleState::Open, LifecycleState::Ready, LifecycleState::Stopped],
        )?;
        let framerate = match &self.config {
            Some(config) => config.framerate,
            None => return Err(self.invalid_state("setup")),
        };
        let device = match self.device.as_mut() {
            Some(device) => device,
            None => {
                return Err(AcqError::InvalidState {
                    operation: "setup",
                    state: self.state,
                })
            }
        };

        self.layout = None;
        self.state = LifecycleState::Open;
        self.identity = DeviceIdentity::default();

        let query = CapabilityQuery::new(device.as_ref());
        let identity = query
            .identity()
            .map_err(|e| AcqError::setup(SetupStep::Capabilities, e))?;
        let plan = FramePlan::discover(&query, framerate).map_err(|e| AcqError::setup(SetupStep::Planning, e))?;

        let sample_rate = plan.sample_rate;
        let samples_per_cycle = plan.samples_per_cycle;
        plan.apply(&mut self.frame);

        let layout =
            AcquisitionLayout::build(&self.frame).map_err(|e| AcqError::setup(SetupStep::Descriptors, e))?;
        device
            .acq_setup(layout.strides(), layout.descriptors())
            .map_err(|e| AcqError::setup(SetupStep::DeviceGroups, AcqError::Vendor(e)))?;

        info!(
            device = DEVICE_NAME,
            model = %identity.model,
            id = %identity.id,
            samples_per_cycle,
            "device correctly configured with samplerate={} Hz",
            sample_rate
        );
        self.identity = identity;
        self.samples_per_cycle = samples_per_cycle;
        self.layout = Some(layout);
        self.state = LifecycleState::Ready;
        Ok(())
    }

    pub fn try_start(&mut self) -> AcqResult<()> {
        self.expect_state("start", &[LifecycleState::Ready, LifecycleState::Stopped])?;
        self.open_device("start")?.start().map_err(AcqError::Start)?;
        self.state = LifecycleState::Streaming;
        Ok(())
    }

    pub fn try_stop(&mut self) -> AcqResult<()> {
        self.expect_state("stop", &[LifecycleState::Streaming])?;
        self.open_device("stop")?.stop().map_err(AcqError::Stop)?;
        self.state = LifecycleState::Stopped;
        Ok(())
    }

    /// Pull one cycle of samples into the frame.
    ///
    /// Returns the number of samples written, fewer than
    /// [`samples_per_cycle`](Self::samples_per_cycle) when the source ran dry.
    pub fn try_get(&mut self) -> AcqResult<usize> {
        self.expect_state("read data", &[LifecycleState::Streaming])?;
        let (device, layout) = match (self.device.as_mut(), self.layout.as_ref()) {
            (Some(device), Some(layout)) => (device, layout),
            _ => {
                return Err(AcqError::InvalidState {
                    operation: "read data",
                    state: self.state,
                })
            }
        };

        let mut buffers = layout.arrange(&mut self.frame)?;
        let count = device
            .get_data(self.samples_per_cycle, &mut buffers)
            .map_err(AcqError::StreamRead)?;
        trace!(device = DEVICE_NAME, requested = self.samples_per_cycle, count, "samples pulled");
        Ok(count)
    }

    /// Samples ready to be pulled without blocking
    pub fn try_available(&self) -> AcqResult<usize> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| self.invalid_state("query available samples"))?;
        device.get_available().map_err(AcqError::StreamRead)
    }

    /// Release the device handle and the installed layout.
    ///
    /// Safe to call in any state and any number of times. A running
    /// acquisition is stopped first; failures are logged and swallowed.
    pub fn release(&mut self) {
        if let Some(mut device) = self.device.take() {
            if self.state == LifecycleState::Streaming {
                if let Err(e) = device.stop() {
                    warn!(device = DEVICE_NAME, error = %e, "cannot stop the device while closing");
                }
            }
            if let Err(e) = device.close() {
                warn!(device = DEVICE_NAME, error = %e, "cannot close the device");
            }
            debug!(device = DEVICE_NAME, "device closed");
        }

        self.layout = None;
        self.state = if self.config.is_some() {
            LifecycleState::Configured
        } else {
            LifecycleState::Unconfigured
        };
    }

    fn open_device(&mut self, operation: &'static str) -> AcqResult<&mut Box<dyn EgdDevice>> {
        let state = self.state;
        self.device
            .as_mut()
            .ok_or(AcqError::InvalidState { operation, state })
    }

    fn expect_state(&self, operation: &'static str, allowed: &[LifecycleState]) -> AcqResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> AcqError {
        AcqError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl Drop for EgdAcquisition {
    fn drop(&mut self) {
        self.release();
    }
}
