// src/error.rs
//! Unified error handling for the acquisition core
//!
//! Every lifecycle operation surfaces failures synchronously as an
//! [`AcqError`]. Setup failures name the step that failed and keep the
//! underlying cause as their source, so a logged chain reads from the
//! lifecycle step down to the vendor's errno text.

use crate::acquisition::LifecycleState;
use crate::hal::{Capability, GroupKind, VendorError};
use std::fmt;
use thiserror::Error;

/// Ordered steps of `setup`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Capabilities,
    Planning,
    Descriptors,
    DeviceGroups,
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStep::Capabilities => write!(f, "device capabilities"),
            SetupStep::Planning => write!(f, "data"),
            SetupStep::Descriptors => write!(f, "data structures"),
            SetupStep::DeviceGroups => write!(f, "the device"),
        }
    }
}

/// Capability field whose query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityField {
    Model,
    Id,
    SampleRate,
    ChannelCount(GroupKind),
    ChannelInfo { kind: GroupKind, channel: usize },
}

impl CapabilityField {
    pub(crate) fn of(cap: Capability) -> Self {
        match cap {
            Capability::DeviceType => CapabilityField::Model,
            Capability::DeviceId => CapabilityField::Id,
            Capability::SampleRate => CapabilityField::SampleRate,
        }
    }
}

impl fmt::Display for CapabilityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityField::Model => write!(f, "device type"),
            CapabilityField::Id => write!(f, "device id"),
            CapabilityField::SampleRate => write!(f, "device sampling rate"),
            CapabilityField::ChannelCount(kind) => write!(f, "number {} channels", kind),
            CapabilityField::ChannelInfo { kind, channel } => {
                write!(f, "info of {} channel {}", kind, channel)
            }
        }
    }
}

/// Unified error type of the acquisition core
#[derive(Debug, Error)]
pub enum AcqError {
    /// Missing or invalid parameter
    #[error("configuration error: {0}")]
    Config(String),

    /// A capability query failed
    #[error("cannot get {field}: {source}")]
    Capability {
        field: CapabilityField,
        #[source]
        source: VendorError,
    },

    /// Layout planning or descriptor construction violated an invariant
    #[error("invalid layout: {0}")]
    Layout(String),

    /// A step of `setup` failed
    #[error("cannot setup {step}: {source}")]
    Setup {
        step: SetupStep,
        #[source]
        source: Box<AcqError>,
    },

    /// Device-level failure outside of a named lifecycle transition
    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error("cannot open the device with arg={selector}: {source}")]
    Open {
        selector: String,
        #[source]
        source: VendorError,
    },

    #[error("cannot start the device: {0}")]
    Start(#[source] VendorError),

    #[error("cannot stop the device: {0}")]
    Stop(#[source] VendorError),

    #[error("error reading data: {0}")]
    StreamRead(#[source] VendorError),

    /// Operation invoked out of lifecycle order
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },
}

impl AcqError {
    /// Wrap an error as the failure of a setup step
    pub fn setup(step: SetupStep, source: AcqError) -> Self {
        AcqError::Setup {
            step,
            source: Box::new(source),
        }
    }

    /// Setup step that failed, if this is a setup error
    pub fn setup_step(&self) -> Option<SetupStep> {
        match self {
            AcqError::Setup { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Result type alias for acquisition operations
pub type AcqResult<T> = Result<T, AcqError>;
