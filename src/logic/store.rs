use crate::error::Result;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::debug;

/// Key/value sink shared by the wizard steps.
pub trait WizardStore {
    fn set_db_property(&mut self, key: &str, value: Value) -> Result<()>;
    fn get_db_property(&self, key: &str) -> Option<&Value>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
}

impl WizardStore for MemoryStore {
    fn set_db_property(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn get_db_property(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Store backed by a single JSON document, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            Map::new()
        };
        Ok(Self { path, values })
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&self.values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl WizardStore for JsonFileStore {
    fn set_db_property(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.persist()?;
        debug!(key, path = %self.path.display(), "wizard property stored");
        Ok(())
    }

    fn get_db_property(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}
