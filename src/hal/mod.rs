// src/hal/mod.rs
//! Hardware Abstraction Layer for eegdev-compatible devices

pub mod simulator;
pub mod traits;
pub mod types;

pub use traits::*;
pub use types::*;
