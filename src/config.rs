//! Pipeline environment configuration.
//!
//! `sitetoc.toml` maps environment names to the directory trees the tool
//! operates on. Missing files fall back to stock defaults so a conventional
//! project layout works with zero configuration:
//!
//! ```toml
//! [environments.dev]
//! dir = "publish/dev"
//! source_roots = ["docs", "utils"]
//! description = "Local development build"
//! ```
//!
//! `dir` is the content root scanned for rendered HTML files. `source_roots`
//! are searched when resolving a document's generated-from reference for the
//! timestamp check; leave it empty to disable that check. Paths are relative
//! to the project root holding the config file.
//!
//! `sitetoc gen-config` prints [`stock_config_toml`] as a documented
//! starting point.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config filename expected in the project root.
pub const CONFIG_FILENAME: &str = "sitetoc.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unknown environment '{name}' (available: {available})")]
    UnknownEnvironment { name: String, available: String },
}

/// One named environment from `sitetoc.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Content root scanned for rendered HTML files.
    pub dir: PathBuf,
    /// Roots searched when resolving generated-from source references.
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,
    /// Human-readable description, shown nowhere critical.
    #[serde(default)]
    pub description: String,
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Environments keyed by name; BTreeMap keeps listings deterministic.
    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,
}

impl Default for PipelineConfig {
    /// Stock layout: `publish/{dev,staging,prod}` fed from `docs/`.
    fn default() -> Self {
        let environments = ["dev", "staging", "prod"]
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    Environment {
                        dir: Path::new("publish").join(name),
                        source_roots: vec![PathBuf::from("docs")],
                        description: format!("{name} build output"),
                    },
                )
            })
            .collect();
        Self { environments }
    }
}

impl PipelineConfig {
    /// Look up an environment by name.
    pub fn environment(&self, name: &str) -> Result<&Environment, ConfigError> {
        self.environments
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEnvironment {
                name: name.to_string(),
                available: self
                    .environments
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Load `sitetoc.toml` from the project root, or stock defaults if absent.
pub fn load_config(project_root: &Path) -> Result<PipelineConfig, ConfigError> {
    let path = project_root.join(CONFIG_FILENAME);
    if !path.exists() {
        debug!("no {CONFIG_FILENAME} in {}, using defaults", project_root.display());
        return Ok(PipelineConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    Ok(toml::from_str(&content)?)
}

/// A documented stock config, printed by `sitetoc gen-config`.
pub fn stock_config_toml() -> String {
    let stock = r#"# sitetoc configuration
#
# Each [environments.NAME] section describes one build output tree.
# Select one at runtime with `sitetoc -e NAME generate`.

[environments.dev]
# Content root scanned for rendered HTML files. Files named index.html
# are skipped (they are application shells, not content).
dir = "publish/dev"
# Roots searched when a document's "automatically generated from" note
# is resolved for the up-to-date check. Leave empty to disable.
source_roots = ["docs"]
description = "dev build output"

[environments.staging]
dir = "publish/staging"
source_roots = ["docs"]
description = "staging build output"

[environments.prod]
dir = "publish/prod"
source_roots = ["docs"]
description = "prod build output"
"#;
    stock.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        let dev = config.environment("dev").unwrap();
        assert_eq!(dev.dir, Path::new("publish/dev"));
        assert_eq!(dev.source_roots, vec![PathBuf::from("docs")]);
    }

    #[test]
    fn loads_environments_from_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"
            [environments.dev]
            dir = "out/dev"
            source_roots = ["content", "extras"]

            [environments.prod]
            dir = "out/prod"
            "#,
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        let dev = config.environment("dev").unwrap();
        assert_eq!(dev.dir, Path::new("out/dev"));
        assert_eq!(dev.source_roots.len(), 2);

        // Unspecified fields default.
        let prod = config.environment("prod").unwrap();
        assert!(prod.source_roots.is_empty());
        assert!(prod.description.is_empty());
    }

    #[test]
    fn unknown_environment_is_an_error() {
        let config = PipelineConfig::default();
        let err = config.environment("qa").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("qa"));
        assert!(message.contains("dev"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "environments = 3").unwrap();
        assert!(matches!(load_config(dir.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn stock_config_parses_into_the_defaults() {
        let parsed: PipelineConfig = toml::from_str(&stock_config_toml()).unwrap();
        assert_eq!(parsed.environments.len(), 3);
        let dev = parsed.environment("dev").unwrap();
        assert_eq!(dev.dir, Path::new("publish/dev"));
    }
}
