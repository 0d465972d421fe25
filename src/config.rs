//! @acp:module "Configuration"
//! @acp:summary "Projection settings loadable from JSON"
//! @acp:domain serialization
//! @acp:layer config

use std::path::Path;

use serde::{Deserialize, Serialize};

/// @acp:summary "How embedded (flattened) record fields are projected"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddedPolicy {
    /// Promote the embedded record's fields into the parent, recursively.
    /// A parent field shadows a promoted field with the same output name.
    #[default]
    Flatten,
    /// Leave embedded records out of the projection.
    Skip,
}

impl std::fmt::Display for EmbeddedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddedPolicy::Flatten => write!(f, "flatten"),
            EmbeddedPolicy::Skip => write!(f, "skip"),
        }
    }
}

/// @acp:summary "Settings shared by a projection and all of its child contexts"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SieveConfig {
    /// Embedded record handling
    #[serde(default)]
    pub embedded: EmbeddedPolicy,
}

impl SieveConfig {
    pub fn with_embedded(mut self, embedded: EmbeddedPolicy) -> Self {
        self.embedded = embedded;
        self
    }

    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// @acp:summary "Save config to a JSON file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SieveConfig::from_json("{}").unwrap();
        assert_eq!(config.embedded, EmbeddedPolicy::Flatten);
        assert_eq!(config, SieveConfig::default());
    }

    #[test]
    fn test_parse_skip() {
        let config = SieveConfig::from_json(r#"{"embedded":"skip"}"#).unwrap();
        assert_eq!(config.embedded, EmbeddedPolicy::Skip);
        assert_eq!(config.embedded.to_string(), "skip");
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let err = SieveConfig::from_json(r#"{"embedded":"merge"}"#).unwrap_err();
        assert_eq!(err.code(), "JSON");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sieve.json");
        let config = SieveConfig::default().with_embedded(EmbeddedPolicy::Skip);
        config.save(&path).unwrap();
        assert_eq!(SieveConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SieveConfig::load("/nonexistent/sieve.json").unwrap_err();
        assert_eq!(err.code(), "IO");
    }
}
