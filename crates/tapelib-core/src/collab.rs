//! Key-value collaborators behind the `sensors` and `config` commands.
//!
//! The core only needs to read a snapshot and merge updates; what the
//! values mean is up to the store.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type StoreMap = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{store} store is unavailable: {reason}")]
    Unavailable { store: &'static str, reason: String },

    #[error("{store} store does not accept updates")]
    ReadOnly { store: &'static str },
}

pub trait KeyValueStore: std::fmt::Debug {
    fn snapshot(&self) -> Result<StoreMap, CollaboratorError>;

    /// Merge `updates` into the store and return the new contents.
    fn merge(&mut self, updates: &BTreeMap<String, String>) -> Result<StoreMap, CollaboratorError>;
}

/// In-process store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    label: &'static str,
    values: StoreMap,
    read_only: bool,
}

impl MemoryStore {
    pub fn new(label: &'static str, values: StoreMap) -> Self {
        Self {
            label,
            values,
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Readings of an idle, healthy library.
    pub fn simulated_sensors() -> Self {
        let mut values = Map::new();
        values.insert("temperature_c".into(), Value::from(21.5));
        values.insert("humidity_pct".into(), Value::from(40));
        values.insert("door_closed".into(), Value::from(true));
        values.insert("power_ok".into(), Value::from(true));
        Self::new("sensors", values).read_only()
    }

    pub fn empty_config() -> Self {
        Self::new("config", Map::new())
    }
}

/// Parameter strings that read as JSON scalars keep their type; anything
/// else is stored as a string.
fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

impl KeyValueStore for MemoryStore {
    fn snapshot(&self) -> Result<StoreMap, CollaboratorError> {
        Ok(self.values.clone())
    }

    fn merge(&mut self, updates: &BTreeMap<String, String>) -> Result<StoreMap, CollaboratorError> {
        if updates.is_empty() {
            return self.snapshot();
        }
        if self.read_only {
            return Err(CollaboratorError::ReadOnly { store: self.label });
        }
        for (key, raw) in updates {
            self.values.insert(key.clone(), parse_value(raw));
        }
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_parses_scalars() {
        let mut store = MemoryStore::empty_config();
        let updates = BTreeMap::from([
            ("depth".to_string(), "8".to_string()),
            ("verbose".to_string(), "true".to_string()),
            ("name".to_string(), "lib-a".to_string()),
        ]);
        let merged = store.merge(&updates).unwrap();
        assert_eq!(merged["depth"], Value::from(8));
        assert_eq!(merged["verbose"], Value::from(true));
        assert_eq!(merged["name"], Value::from("lib-a"));
    }

    #[test]
    fn empty_merge_is_a_read() {
        let mut sensors = MemoryStore::simulated_sensors();
        let values = sensors.merge(&BTreeMap::new()).unwrap();
        assert_eq!(values["power_ok"], Value::from(true));
    }

    #[test]
    fn read_only_store_refuses_updates() {
        let mut sensors = MemoryStore::simulated_sensors();
        let updates = BTreeMap::from([("power_ok".to_string(), "false".to_string())]);
        assert_eq!(
            sensors.merge(&updates),
            Err(CollaboratorError::ReadOnly { store: "sensors" })
        );
        assert_eq!(sensors.snapshot().unwrap()["power_ok"], Value::from(true));
    }
}
