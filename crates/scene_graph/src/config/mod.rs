//! Configuration system
//!
//! [`SceneConfig`] gathers the runtime policies of a scene graph: child
//! replacement, traversal error handling, serialization mode, import search
//! paths and the log filter used by hosts. Configs load from `.toml` or
//! `.ron` files through the [`Config`] trait.

pub use serde::{Serialize, Deserialize};

use crate::scene::{ChildPolicy, SerializationMode};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Format is picked from the extension
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parsed but make no sense together
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// # Import Configuration
///
/// Where importers look for relative source locators and which file
/// extensions they accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Directories searched, in order, for relative source locators
    pub search_paths: Vec<String>,
    /// Lower-case file extensions the default importer accepts
    pub enabled_formats: Vec<String>,
}

impl ImportConfig {
    /// Create the default import configuration
    pub fn new() -> Self {
        Self {
            search_paths: vec![".".to_string(), "resources/models".to_string()],
            enabled_formats: vec!["obj".to_string()],
        }
    }

    /// Replace the search paths
    pub fn with_search_paths(mut self, paths: Vec<String>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Check whether an extension is enabled (case-insensitive)
    pub fn accepts(&self, extension: &str) -> bool {
        self.enabled_formats.iter().any(|f| f.eq_ignore_ascii_case(extension))
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Scene Configuration
///
/// Top-level configuration for a scene graph and the host driving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Log filter handed to `env_logger` by hosts
    pub log_level: String,
    /// What `add` does when a child with the same name already exists
    pub child_policy: ChildPolicy,
    /// Abort a traversal at the first error instead of finishing siblings
    pub fail_fast: bool,
    /// Mode used by hosts when they serialize on demand
    pub serialization_mode: SerializationMode,
    /// Importer settings
    pub import: ImportConfig,
}

impl SceneConfig {
    /// Create a new scene configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            child_policy: ChildPolicy::Replace,
            fail_fast: true,
            serialization_mode: SerializationMode::Full,
            import: ImportConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the duplicate-child policy
    pub fn with_child_policy(mut self, policy: ChildPolicy) -> Self {
        self.child_policy = policy;
        self
    }

    /// Enable or disable fail-fast traversal
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Set the serialization mode
    pub fn with_serialization_mode(mut self, mode: SerializationMode) -> Self {
        self.serialization_mode = mode;
        self
    }

    /// Set the import configuration
    pub fn with_import(mut self, import: ImportConfig) -> Self {
        self.import = import;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log level cannot be empty".to_string()));
        }
        if self.import.enabled_formats.iter().any(|f| f.is_empty() || f.starts_with('.')) {
            return Err(ConfigError::Invalid(
                "import formats must be bare extensions such as \"obj\"".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_fail_fast_and_replace() {
        let config = SceneConfig::default();
        assert!(config.fail_fast);
        assert_eq!(config.child_policy, ChildPolicy::Replace);
        assert!(config.import.accepts("OBJ"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SceneConfig = toml::from_str(
            "fail_fast = false\nchild_policy = \"Reject\"\n",
        )
        .unwrap();

        assert!(!config.fail_fast);
        assert_eq!(config.child_policy, ChildPolicy::Reject);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("scene_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let config = SceneConfig::new()
            .with_log_level("debug")
            .with_serialization_mode(SerializationMode::DiffOnly);

        config.save_to_file(&path).unwrap();
        let loaded = SceneConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SceneConfig::load_from_file("scene.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_)) | Err(ConfigError::UnsupportedFormat(_))));
        assert!(matches!(
            SceneConfig::default().save_to_file("scene.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_validate_rejects_dotted_formats() {
        let config = SceneConfig::new()
            .with_import(ImportConfig { search_paths: vec![], enabled_formats: vec![".obj".into()] });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
