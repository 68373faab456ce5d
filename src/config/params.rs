// src/config/params.rs
//! Parameter sources consulted by `configure`

use std::collections::HashMap;

/// Read-only key/value parameter store
pub trait ParameterSource: Send {
    /// String value of `key`, if set
    fn string(&self, key: &str) -> Option<String>;

    /// Integer value of `key`, if set and numeric
    fn integer(&self, key: &str) -> Option<i64>;
}

/// In-memory parameter store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryParameters {
    values: HashMap<String, ParamValue>,
}

#[derive(Debug, Clone, PartialEq)]
enum ParamValue {
    Text(String),
    Integer(i64),
}

impl MemoryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_string(key, value);
        self
    }

    pub fn with_integer(mut self, key: &str, value: i64) -> Self {
        self.set_integer(key, value);
        self
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), ParamValue::Text(value.into()));
    }

    pub fn set_integer(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), ParamValue::Integer(value));
    }
}

impl ParameterSource for MemoryParameters {
    fn string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Integer(i) => Some(i.to_string()),
        }
    }

    fn integer(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            ParamValue::Text(s) => s.trim().parse().ok(),
            ParamValue::Integer(i) => Some(*i),
        }
    }
}

/// Layered store built by [`crate::config::ConfigLoader`]; keys are looked up
/// first as given, then below the `device` table.
impl ParameterSource for ::config::Config {
    fn string(&self, key: &str) -> Option<String> {
        self.get_string(key)
            .or_else(|_| self.get_string(&format!("device.{}", key)))
            .ok()
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.get_int(key)
            .or_else(|_| self.get_int(&format!("device.{}", key)))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::keys;

    #[test]
    fn test_memory_parameters_lookup() {
        let store = MemoryParameters::new()
            .with_string(keys::DEVARG, "gtec")
            .with_integer(keys::SAMPLERATE, 512);

        assert_eq!(store.string(keys::DEVARG).as_deref(), Some("gtec"));
        assert_eq!(store.integer(keys::SAMPLERATE), Some(512));
        assert_eq!(store.string(keys::DEVEXT), None);
    }

    #[test]
    fn test_memory_parameters_convert_between_types() {
        let store = MemoryParameters::new()
            .with_string(keys::SAMPLERATE, " 256 ")
            .with_integer("answer", 42);

        assert_eq!(store.integer(keys::SAMPLERATE), Some(256));
        assert_eq!(store.string("answer").as_deref(), Some("42"));
        assert_eq!(MemoryParameters::new().with_string("x", "abc").integer("x"), None);
    }

    #[test]
    fn test_config_store_falls_back_to_device_table() {
        let store = ::config::Config::builder()
            .set_override("device.devarg", "eego")
            .unwrap()
            .set_override("samplerate", 1000i64)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(store.string(keys::DEVARG).as_deref(), Some("eego"));
        assert_eq!(store.integer(keys::SAMPLERATE), Some(1000));
        assert_eq!(store.string(keys::DEVEXT), None);
    }
}
