use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_CLASSPATH_CACHE_TTL, STRICT_ENV_VAR};
use crate::core::BzlError;
use crate::graph::{ExternalDeps, GraphBuilder, OrderingStrategy};

const fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CLASSPATH_CACHE_TTL.as_secs()
}

/// Resolver settings for one workspace.
///
/// Every field has a default, so an empty file (or no file) is valid:
///
/// ```toml
/// classpath_cache_ttl_secs = 300
/// strict = false
/// explicit_java_test_deps = false
/// include_target_granularity = false
/// follow_external_transitives = false
/// ordering = "topological"
/// bazel_bin_dir = "bazel-bin"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Seconds a computed classpath stays valid without an explicit invalidation.
    pub classpath_cache_ttl_secs: u64,

    /// Propagate resolution errors instead of degrading to an incomplete
    /// classpath. Meant for test runs; also set by `BZLJVM_STRICT`.
    pub strict: bool,

    /// The workspace passes `--explicit_java_test_deps`, so test targets
    /// declare their runner dependencies and none are injected.
    pub explicit_java_test_deps: bool,

    /// Build graphs over individual targets instead of packages.
    pub include_target_granularity: bool,

    /// Let reachability and ordering queries walk through external labels.
    pub follow_external_transitives: bool,

    /// Algorithm used to order labels.
    pub ordering: OrderingStrategy,

    /// Bazel output tree; relative paths are resolved against the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bazel_bin_dir: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            classpath_cache_ttl_secs: default_cache_ttl_secs(),
            strict: false,
            explicit_java_test_deps: false,
            include_target_granularity: false,
            follow_external_transitives: false,
            ordering: OrderingStrategy::default(),
            bazel_bin_dir: None,
        }
    }
}

impl ResolverConfig {
    /// Load the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read resolver config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse resolver config from {}", path.display()))
    }

    /// Load from an explicit path, or from `bzljvm.toml` in `workspace_root`
    /// when it exists, falling back to defaults. Environment overrides are
    /// applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, a config file
    /// is malformed, or an override variable has an invalid value.
    pub async fn load_or_default(explicit: Option<&Path>, workspace_root: &Path) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path).await?,
            None => {
                let path = workspace_root.join(CONFIG_FILE_NAME);
                if fs::try_exists(&path).await.unwrap_or(false) {
                    Self::load_from(&path).await?
                } else {
                    tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, workspace_root.display());
                    Self::default()
                }
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), BzlError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides using `lookup` to read variables.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), BzlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(STRICT_ENV_VAR) {
            self.strict = parse_flag(&value).ok_or_else(|| BzlError::ConfigError {
                message: format!("{STRICT_ENV_VAR} must be a boolean, got '{value}'"),
            })?;
            tracing::debug!("{} overrides strict = {}", STRICT_ENV_VAR, self.strict);
        }
        Ok(())
    }

    /// Cache lifetime as a [`Duration`].
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.classpath_cache_ttl_secs)
    }

    /// The Bazel output tree for a workspace.
    pub fn bazel_bin_dir(&self, workspace_root: &Path) -> PathBuf {
        match &self.bazel_bin_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => workspace_root.join(dir),
            None => workspace_root.join("bazel-bin"),
        }
    }

    /// A graph builder honoring the granularity setting.
    pub fn graph_builder(&self) -> GraphBuilder {
        GraphBuilder::new()
            .with_target_granularity(self.include_target_granularity)
            .with_external_deps(ExternalDeps::Include)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert!(!config.strict);
        assert_eq!(config.ordering, OrderingStrategy::Topological);
        assert_eq!(config.bazel_bin_dir(Path::new("/ws")), PathBuf::from("/ws/bazel-bin"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ResolverConfig = toml::from_str(
            r#"
            strict = true
            ordering = "insertion"
            bazel_bin_dir = "out/bin"
            "#,
        )
        .unwrap();

        assert!(config.strict);
        assert_eq!(config.ordering, OrderingStrategy::Insertion);
        assert_eq!(config.classpath_cache_ttl_secs, 300);
        assert_eq!(config.bazel_bin_dir(Path::new("/ws")), PathBuf::from("/ws/out/bin"));
    }

    #[test]
    fn test_env_override() {
        let mut config = ResolverConfig::default();
        config
            .apply_overrides_from(|name| (name == STRICT_ENV_VAR).then(|| "TRUE".to_string()))
            .unwrap();
        assert!(config.strict);

        let err = config.apply_overrides_from(|_| Some("maybe".to_string())).unwrap_err();
        assert!(matches!(err, BzlError::ConfigError { .. }));
    }

    #[tokio::test]
    async fn test_load_from_workspace_root() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "classpath_cache_ttl_secs = 10\n").unwrap();

        let config = ResolverConfig::load_from(&temp.path().join(CONFIG_FILE_NAME)).await.unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(10));

        let missing = ResolverConfig::load_from(&temp.path().join("nope.toml")).await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_malformed_config_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "strict = \"sometimes\"\n").unwrap();

        let err = ResolverConfig::load_from(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse resolver config"));
    }
}
