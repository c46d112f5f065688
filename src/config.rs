//! Configuration handling for apibook
//!
//! Settings come from three layers: built-in defaults, an optional
//! `apibook.toml`, and command-line flags. Later layers win.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use apibook_core::error::ApibookError;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "apibook.toml";

/// apibook configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// apibook settings
    #[serde(default)]
    pub apibook: ApibookConfig,
}

/// Rendering and collection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApibookConfig {
    /// Template for `SUMMARY.md`
    #[serde(default)]
    pub summary_template: Option<PathBuf>,

    /// Column budget before a call signature is reflowed
    #[serde(default = "default_signature_width")]
    pub signature_width: usize,

    /// `_`-prefixed method names that are rendered anyway
    #[serde(default = "default_visible_private")]
    pub visible_private: Vec<String>,

    /// Globs of source paths to skip, relative to the root
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_signature_width() -> usize {
    80
}

fn default_visible_private() -> Vec<String> {
    vec!["__init__".to_string(), "__call__".to_string()]
}

impl Default for ApibookConfig {
    fn default() -> Self {
        Self {
            summary_template: None,
            signature_width: default_signature_width(),
            visible_private: default_visible_private(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ApibookError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ApibookError::config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            ApibookError::config(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load `apibook.toml` from the given directory, or the defaults when
    /// there is none
    pub fn load_from_dir(dir: &Path) -> Result<Self, ApibookError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.apibook.signature_width, 80);
        assert_eq!(config.apibook.visible_private, vec!["__init__", "__call__"]);
        assert!(config.apibook.summary_template.is_none());
        assert!(config.apibook.exclude.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str("[apibook]\nsignature_width = 100\n").unwrap();
        assert_eq!(config.apibook.signature_width, 100);
        assert_eq!(config.apibook.visible_private.len(), 2);
    }

    #[test]
    fn full_file() {
        let config: Config = toml::from_str(
            r#"
[apibook]
summary_template = "doc/SUMMARY.tmpl"
signature_width = 60
visible_private = ["__init__"]
exclude = ["tests/**"]
"#,
        )
        .unwrap();
        assert_eq!(
            config.apibook.summary_template,
            Some(PathBuf::from("doc/SUMMARY.tmpl"))
        );
        assert_eq!(config.apibook.visible_private, vec!["__init__"]);
        assert_eq!(config.apibook.exclude, vec!["tests/**"]);
    }

    #[test]
    fn load_from_dir_without_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load_from_dir(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn load_from_dir_with_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[apibook]\nexclude = [\"_vendor/**\"]\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.apibook.exclude, vec!["_vendor/**"]);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[apibook\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ApibookError::Config { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ApibookError::Config { .. }));
    }
}
