use confyg::{env, Confygery};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::collection::DEFAULT_NUM_PARTITIONS;
use crate::error::{Error, Result};

/// Construction parameters for a [`Collection`](crate::Collection).
///
/// Configuration can be loaded from multiple sources with the following
/// priority:
/// 1. Environment variables (PARTIVEC_* prefix)
/// 2. Config file (TOML)
/// 3. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name.
    ///
    /// Can be set via:
    /// - ENV: PARTIVEC_NAME
    /// - Config: name = "products"
    pub name: String,

    /// Dimension every vector must have. Must be positive.
    ///
    /// Can be set via:
    /// - ENV: PARTIVEC_DIM
    /// - Config: dim = 384
    #[serde(deserialize_with = "deserialize_count")]
    pub dim: usize,

    /// Explicit partition names, in order. Takes precedence over
    /// `default_num_partitions`.
    #[serde(default)]
    pub partition_names: Option<Vec<String>>,

    /// How many `partition_N` partitions to generate when no names are given.
    #[serde(
        default = "default_num_partitions",
        deserialize_with = "deserialize_count"
    )]
    pub default_num_partitions: usize,
}

impl CollectionConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, dim: usize) -> Self {
        Self {
            name: name.into(),
            dim,
            partition_names: None,
            default_num_partitions: DEFAULT_NUM_PARTITIONS,
        }
    }

    #[must_use]
    pub fn with_partition_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_default_num_partitions(mut self, count: usize) -> Self {
        self.default_num_partitions = count;
        self
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Load configuration from a TOML file, with PARTIVEC_* environment
    /// variables layered on top.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file cannot be read or the
    /// merged result is incomplete.
    pub fn load(path: &Path) -> Result<Self> {
        let mut builder = Confygery::new()
            .map_err(|e| config_error("failed to create config builder", &e))?;

        if path.exists() {
            let path_str = path.to_str().ok_or_else(|| {
                Error::Configuration("config path contains invalid UTF-8".to_string())
            })?;
            builder
                .add_file(path_str)
                .map_err(|e| config_error("failed to load config file", &e))?;
        } else {
            log::debug!("No config file at {}", path.display());
        }

        let env_opts = env::Options::with_top_level("partivec");
        builder
            .add_env(env_opts)
            .map_err(|e| config_error("failed to load environment variables", &e))?;

        let config: Self = builder
            .build()
            .map_err(|e| config_error("failed to build configuration", &e))?;

        log::debug!("Loaded config for collection '{}'", config.name);
        Ok(config)
    }

    /// Load from the platform config file (see [`config_file_path`]).
    pub fn load_default() -> Result<Self> {
        Self::load(&config_file_path())
    }
}

fn default_num_partitions() -> usize {
    DEFAULT_NUM_PARTITIONS
}

/// Environment variables arrive as strings, so counts accept either form.
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(usize),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "expected a non-negative integer, got \"{}\"",
                text
            ))
        }),
    }
}

fn config_error(context: &str, err: &impl std::fmt::Display) -> Error {
    Error::Configuration(format!("{}: {}", context, err))
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/partivec/config.toml
/// - macOS: ~/Library/Application Support/partivec/config.toml
/// - Windows: %APPDATA%\partivec\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("partivec")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Partivec Collection Configuration
#
# Values here can be overridden by PARTIVEC_* environment variables.

# Name of the collection
name = "products"

# Dimension of every stored and query vector
dim = 4

# Explicit partition names, in order. New vectors upserted without a
# partition are routed among these by a stable hash of their ID.
partition_names = ["fruits", "juices", "others"]

# Used only when partition_names is absent: generates
# partition_0 .. partition_{N-1}
#default_num_partitions = 2
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_example_config_parses() {
        let config = CollectionConfig::from_toml_str(example_config()).unwrap();
        assert_eq!(config.name, "products");
        assert_eq!(config.dim, 4);
        assert_eq!(
            config.partition_names,
            Some(vec![
                "fruits".to_string(),
                "juices".to_string(),
                "others".to_string()
            ])
        );
        assert_eq!(config.default_num_partitions, 2);
    }

    #[test]
    fn test_defaults_when_omitted() {
        let config = CollectionConfig::from_toml_str("name = \"docs\"\ndim = 8\n").unwrap();
        assert!(config.partition_names.is_none());
        assert_eq!(config.default_num_partitions, DEFAULT_NUM_PARTITIONS);
        assert_eq!(config, CollectionConfig::new("docs", 8));
    }

    #[test]
    fn test_missing_dim_is_error() {
        let err = CollectionConfig::from_toml_str("name = \"docs\"\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_negative_dim_is_error() {
        assert!(CollectionConfig::from_toml_str("name = \"docs\"\ndim = -3\n").is_err());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let config = CollectionConfig::from_toml_str(
            "name = \"docs\"\ndim = \"16\"\ndefault_num_partitions = \" 3 \"\n",
        )
        .unwrap();
        assert_eq!(config.dim, 16);
        assert_eq!(config.default_num_partitions, 3);
    }

    #[test]
    fn test_non_numeric_string_rejected() {
        let err =
            CollectionConfig::from_toml_str("name = \"docs\"\ndim = \"wide\"\n").unwrap_err();
        assert!(err.to_string().contains("wide"));
    }

    #[test]
    fn test_builder() {
        let config = CollectionConfig::new("c", 3).with_partition_names(["a", "b"]);
        assert_eq!(
            config.partition_names,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(example_config().as_bytes()).unwrap();

        let config = CollectionConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "products");
        assert_eq!(config.dim, 4);
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with("partivec/config.toml"));
    }
}
