//! Common utility functions shared by the acquisition core

pub mod time;

pub use time::{MockTimeProvider, MonotonicTimeProvider, TimeProvider};
