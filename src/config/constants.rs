//! System-wide configuration constants

/// Device identification constants
pub mod device {
    /// Name used in every diagnostic emitted by the acquisition device
    pub const DEVICE_NAME: &str = "egddev";
    /// Number of channel groups handled per device
    pub const GROUP_COUNT: usize = 3;
    /// Requested sample rate meaning "use the device default"
    pub const DEVICE_DEFAULT_SAMPLERATE: u32 = 0;
}

/// Parameter-store keys read by `configure`
pub mod keys {
    pub const DEVARG: &str = "devarg";
    pub const DEVEXT: &str = "devext";
    pub const SAMPLERATE: &str = "samplerate";
}

/// Device selector grammar constants
pub mod selector {
    /// Prefix of selectors naming a recorded data file
    pub const DATAFILE_PREFIX: &str = "datafile|path|";
    /// Separator between selector tokens
    pub const SEPARATOR: char = '|';
    /// File extensions recognized as recorded-file sources
    pub const FILE_EXTENSIONS: &[&str] = &[".bdf", ".gdf"];
    /// Vendor keys and the option name each uses for the sample rate
    pub const SAMPLERATE_OPTIONS: &[(&str, &str)] = &[("gtec", "samplerate"), ("eego", "SR")];
}

/// Acquisition timing constants
pub mod timing {
    pub const DEFAULT_FRAMERATE_HZ: u32 = 16;
}

/// Configuration source constants
pub mod paths {
    pub const DEFAULT_CONFIG_FILES: &[&str] = &["egd.toml", "config/egd.toml"];
    pub const ENV_PREFIX: &str = "EGD";
    pub const ENV_SEPARATOR: &str = "__";
}
