use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use tracing::Level;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LogsConfig {
    #[serde(deserialize_with = "level_deserialize")]
    pub level: Level,
    /// Directory for `device-registry.log`, stdout when absent.
    pub storage_path: Option<String>,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            storage_path: None,
        }
    }
}

impl LogsConfig {
    pub fn parse_dir(&self) -> anyhow::Result<Option<PathBuf>> {
        let Some(storage_path) = &self.storage_path else {
            return Ok(None);
        };
        let path = super::read_path(storage_path)?;
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create logs directory. {:?}", path))?;
        Ok(Some(path.canonicalize().with_context(|| {
            format!("Failed to parse logs directory. {:?}", path)
        })?))
    }
}

pub fn parse_level(s: &str) -> anyhow::Result<Level> {
    match s.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => anyhow::bail!("Unsupported log level: {}", s),
    }
}

fn level_deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_level(&s).map_err(serde::de::Error::custom)
}
