use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Map configuration the reconciler reads from the display.
///
/// JSON shape (camelCase, as served alongside the map):
///
/// ```json
/// { "defaultProjection": "geographic",
///   "projections": { "geographic": { "name": "Geographic" }, "arctic": {} } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub default_projection: String,
    /// Projection id -> display-specific settings. Only the ids matter here;
    /// the settings are carried through for the display untouched.
    pub projections: BTreeMap<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid map config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map config defines no projections")]
    NoProjections,
    #[error("default projection {0:?} is not a known projection")]
    UnknownDefault(String),
}

impl MapConfig {
    /// Build a config from projection ids with empty settings.
    pub fn new<I, S>(default_projection: impl Into<String>, projections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            default_projection: default_projection.into(),
            projections: projections
                .into_iter()
                .map(|id| (id.into(), Value::Object(Default::default())))
                .collect(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projections.is_empty() {
            return Err(ConfigError::NoProjections);
        }
        if !self.is_known(&self.default_projection) {
            return Err(ConfigError::UnknownDefault(self.default_projection.clone()));
        }
        Ok(())
    }

    pub fn is_known(&self, projection: &str) -> bool {
        self.projections.contains_key(projection)
    }
}
