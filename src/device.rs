// src/device.rs
//! Host-facing acquisition device interface
//!
//! Acquisition hosts drive devices through boolean operations and read the
//! outcome from their log. [`EgdAcquisition`] implements the interface on top
//! of its `Result`-returning lifecycle; every failure is logged with the
//! device name and its full error chain.

use crate::acquisition::EgdAcquisition;
use crate::error::AcqResult;
use crate::frame::NeuroFrame;
use crate::hal::DeviceIdentity;
use std::error::Error;
use tracing::error;

/// Acquisition device as seen by a host pipeline
pub trait Device: Send {
    fn name(&self) -> &str;

    /// Read the device parameters and adopt the frame to fill
    fn configure(&mut self, frame: NeuroFrame, framerate: u32) -> bool;

    fn setup(&mut self) -> bool;

    fn open(&mut self) -> bool;

    /// Release the device; always succeeds
    fn close(&mut self) -> bool;

    fn start(&mut self) -> bool;

    fn stop(&mut self) -> bool;

    /// Pull one cycle of samples; `None` when the read failed
    fn get(&mut self) -> Option<usize>;

    /// Samples ready without blocking, 0 when unknown
    fn get_available(&self) -> usize;

    fn frame(&self) -> &NeuroFrame;

    fn device_info(&self) -> &DeviceIdentity;
}

/// Log a failed operation and collapse the result
fn report<T>(name: &str, operation: &str, result: AcqResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let mut chain = err.to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                let text = cause.to_string();
                if !chain.contains(&text) {
                    chain.push_str(": ");
                    chain.push_str(&text);
                }
                source = cause.source();
            }
            error!(device = name, operation, "[{}] {}", name, chain);
            None
        }
    }
}

impl Device for EgdAcquisition {
    fn name(&self) -> &str {
        EgdAcquisition::name(self)
    }

    fn configure(&mut self, frame: NeuroFrame, framerate: u32) -> bool {
        let result = self.try_configure(frame, framerate);
        report(EgdAcquisition::name(self), "configure", result).is_some()
    }

    fn setup(&mut self) -> bool {
        let result = self.try_setup();
        report(EgdAcquisition::name(self), "setup", result).is_some()
    }

    fn open(&mut self) -> bool {
        let result = self.try_open();
        report(EgdAcquisition::name(self), "open", result).is_some()
    }

    fn close(&mut self) -> bool {
        self.release();
        true
    }

    fn start(&mut self) -> bool {
        let result = self.try_start();
        report(EgdAcquisition::name(self), "start", result).is_some()
    }

    fn stop(&mut self) -> bool {
        let result = self.try_stop();
        report(EgdAcquisition::name(self), "stop", result).is_some()
    }

    fn get(&mut self) -> Option<usize> {
        let result = self.try_get();
        report(EgdAcquisition::name(self), "get", result)
    }

    fn get_available(&self) -> usize {
        let result = self.try_available();
        report(EgdAcquisition::name(self), "get_available", result).unwrap_or(0)
    }

    fn frame(&self) -> &NeuroFrame {
        EgdAcquisition::frame(self)
    }

    fn device_info(&self) -> &DeviceIdentity {
        EgdAcquisition::device_info(self)
    }
}
