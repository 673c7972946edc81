// Local configuration: which project/instance to update and which
// authorized-network entry belongs to this machine. The file is a flat JSON
// object that is rewritten in full every time something changes.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::debug;

use crate::api::InstanceRef;

pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Contents of `config.json`. Every field is optional on disk; keys this
/// program does not know about are kept in `extra` so a rewrite never drops
/// them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// The instance this config points at, if both ids are set. Empty strings
    /// count as set.
    pub fn instance(&self) -> Option<InstanceRef> {
        match (&self.project_id, &self.instance_id) {
            (Some(project_id), Some(instance_id)) => Some(InstanceRef {
                project_id: project_id.clone(),
                instance_id: instance_id.clone(),
            }),
            _ => None,
        }
    }

    /// Remembered entry name, ignoring an empty one left by an aborted run.
    pub fn remembered_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Build a config from whatever JSON object the file holds. Numbers and
    /// booleans in the known fields are taken as their text; any other type
    /// leaves the field unset. Everything else lands in `extra`.
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let project_id = take_text(&mut object, "projectId");
        let instance_id = take_text(&mut object, "instanceId");
        let name = take_text(&mut object, "name");
        Config {
            project_id,
            instance_id,
            name,
            extra: object,
        }
    }
}

fn take_text(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    match object.remove(key)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Where the config lives between runs.
pub trait ConfigStore {
    fn load(&self) -> Result<Config>;
    fn save(&mut self, config: &Config) -> Result<()>;
}

/// JSON file on disk, `./config.json` unless overridden.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }
}

impl ConfigStore for FileStore {
    fn load(&self) -> Result<Config> {
        let data = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        match value {
            Value::Object(object) => Ok(Config::from_object(object)),
            _ => bail!("{} does not hold a JSON object", self.path.display()),
        }
    }

    fn save(&mut self, config: &Config) -> Result<()> {
        let data = serde_json::to_string_pretty(config).context("Serializing config")?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

/// Keeps the config in memory. `saves` counts how often it was written.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub config: Option<Config>,
    pub saves: usize,
}

impl MemoryStore {
    pub fn new(config: Option<Config>) -> Self {
        MemoryStore { config, saves: 0 }
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<Config> {
        self.config.clone().context("No config stored")
    }

    fn save(&mut self, config: &Config) -> Result<()> {
        self.config = Some(config.clone());
        self.saves += 1;
        Ok(())
    }
}
