//! Global settings store capability and snapshots

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::SettingAccessError;

/// The global settings the reconciler saves, overwrites and restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    TabSize,
    IndentSize,
    InsertTabs,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [
        SettingKey::TabSize,
        SettingKey::IndentSize,
        SettingKey::InsertTabs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::TabSize => "TabSize",
            SettingKey::IndentSize => "IndentSize",
            SettingKey::InsertTabs => "InsertTabs",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Int(i32),
    Bool(bool),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Host-side settings the reconciler mutates.
pub trait SettingsStore {
    fn get(&self, key: SettingKey) -> Result<SettingValue, SettingAccessError>;

    fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingAccessError>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for &mut S {
    fn get(&self, key: SettingKey) -> Result<SettingValue, SettingAccessError> {
        (**self).get(key)
    }

    fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingAccessError> {
        (**self).set(key, value)
    }
}

/// Values of the fixed setting set captured at one instant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsSnapshot {
    values: BTreeMap<SettingKey, SettingValue>,
}

impl SettingsSnapshot {
    /// Read every key from `store`, leaving out the ones it rejects.
    pub fn capture<S: SettingsStore + ?Sized>(store: &S) -> (Self, Vec<SettingAccessError>) {
        let mut values = BTreeMap::new();
        let mut errors = Vec::new();
        for key in SettingKey::ALL {
            match store.get(key) {
                Ok(value) => {
                    values.insert(key, value);
                }
                Err(err) => errors.push(err),
            }
        }
        (Self { values }, errors)
    }

    pub fn get(&self, key: SettingKey) -> Option<SettingValue> {
        self.values.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingKey, SettingValue)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for SettingsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("[{k}, {v}]")).collect();
        f.write_str(&parts.join(""))
    }
}

/// In-process settings store. Keys can be marked unsupported to simulate a
/// host that rejects them.
#[derive(Debug, Default, Clone)]
pub struct InMemorySettings {
    values: BTreeMap<SettingKey, SettingValue>,
    unsupported: BTreeSet<SettingKey>,
    writes: usize,
}

impl InMemorySettings {
    pub fn new(tab_size: i32, indent_size: i32, insert_tabs: bool) -> Self {
        Self::default()
            .with(SettingKey::TabSize, SettingValue::Int(tab_size))
            .with(SettingKey::IndentSize, SettingValue::Int(indent_size))
            .with(SettingKey::InsertTabs, SettingValue::Bool(insert_tabs))
    }

    pub fn with(mut self, key: SettingKey, value: SettingValue) -> Self {
        self.values.insert(key, value);
        self
    }

    pub fn unsupported(mut self, key: SettingKey) -> Self {
        self.unsupported.insert(key);
        self
    }

    pub fn value(&self, key: SettingKey) -> Option<SettingValue> {
        self.values.get(&key).copied()
    }

    /// Number of successful `set` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// One `Key = value` line per stored setting.
    pub fn render(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{k} = {v}\n"))
            .collect()
    }

    fn check(&self, key: SettingKey) -> Result<(), SettingAccessError> {
        if self.unsupported.contains(&key) {
            return Err(SettingAccessError {
                key,
                reason: "not supported for this content type".into(),
            });
        }
        Ok(())
    }
}

impl SettingsStore for InMemorySettings {
    fn get(&self, key: SettingKey) -> Result<SettingValue, SettingAccessError> {
        self.check(key)?;
        self.values.get(&key).copied().ok_or_else(|| SettingAccessError {
            key,
            reason: "no value".into(),
        })
    }

    fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingAccessError> {
        self.check(key)?;
        self.values.insert(key, value);
        self.writes += 1;
        Ok(())
    }
}
