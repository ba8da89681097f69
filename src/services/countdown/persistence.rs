//! Durable key-value slot that remembers the countdown target across runs.
//!
//! The target lives under a single process-wide key, `targetDate`, encoded
//! as RFC 3339. Any [`KeyValueStore`] can back it: a JSON file, a SQLite
//! table, or plain memory.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde_json::Error as SerdeError;

pub const TARGET_DATE_KEY: &str = "targetDate";

/// Minimal string key-value storage.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// The single persisted target slot.
pub struct TargetSlot {
    store: Box<dyn KeyValueStore>,
}

impl TargetSlot {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save(&mut self, target: DateTime<Local>) -> Result<()> {
        self.store.set(TARGET_DATE_KEY, &target.to_rfc3339())
    }

    /// Loads the saved target. A value that no longer parses is logged and
    /// treated as absent.
    pub fn load(&self) -> Result<Option<DateTime<Local>>> {
        let Some(raw) = self.store.get(TARGET_DATE_KEY)? else {
            return Ok(None);
        };

        match DateTime::parse_from_rfc3339(&raw) {
            Ok(parsed) => Ok(Some(parsed.with_timezone(&Local))),
            Err(err) => {
                log::warn!("Ignoring unreadable saved target {:?}: {}", raw, err);
                Ok(None)
            }
        }
    }

    pub fn delete(&mut self) -> Result<()> {
        self.store.remove(TARGET_DATE_KEY)
    }
}

/// JSON object of string values on disk. A missing file reads as empty.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read store from {}", self.path.display()))?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&data).map_err(|err| map_deser_error(err, &self.path))
    }

    fn save_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {}", parent.display()))?;
        }

        let data = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write store to {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.save_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.load_entries()?;
        if entries.remove(key).is_some() {
            self.save_entries(&entries)?;
        }
        Ok(())
    }
}

fn map_deser_error(err: SerdeError, path: &Path) -> anyhow::Error {
    anyhow::Error::new(err).context(format!(
        "failed to deserialize store from {}",
        path.display()
    ))
}

#[derive(Debug, Default)]
struct MemoryEntries {
    values: BTreeMap<String, String>,
    set_calls: usize,
    remove_calls: usize,
}

/// In-process store. Clones share the same entries, which lets tests keep a
/// handle after giving the store to a controller.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryEntries>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls seen so far.
    pub fn set_calls(&self) -> usize {
        self.inner.borrow().set_calls
    }

    /// Number of `remove` calls seen so far.
    pub fn remove_calls(&self) -> usize {
        self.inner.borrow().remove_calls
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.borrow().values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.set_calls += 1;
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.remove_calls += 1;
        inner.values.remove(key);
        Ok(())
    }
}
