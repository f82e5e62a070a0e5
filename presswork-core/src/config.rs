//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the presswork.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    /// Extension of article source files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub on_collision: CollisionPolicy,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_extension() -> String {
    String::from("md")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            extension: default_extension(),
            on_collision: CollisionPolicy::default(),
            config_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_articles")]
    pub articles: PathBuf,

    #[serde(default = "default_template")]
    pub template: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default = "default_index")]
    pub index: PathBuf,
}

fn default_articles() -> PathBuf {
    PathBuf::from("articles")
}

fn default_template() -> PathBuf {
    PathBuf::from("templates/newspaper.html")
}

fn default_output() -> PathBuf {
    PathBuf::from("news")
}

fn default_index() -> PathBuf {
    PathBuf::from("news/index.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            articles: default_articles(),
            template: default_template(),
            output: default_output(),
            index: default_index(),
        }
    }
}

/// What to do when two articles in one run map to the same output file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Fail the later article and keep the first page
    #[default]
    Error,
    /// Let the later article overwrite the earlier page
    Overwrite,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents)?
        };

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load the config file if it exists, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}; using defaults", path);
            Ok(Self::default())
        }
    }

    /// Get the articles directory, resolved relative to config file
    pub fn articles_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.articles)
    }

    /// Get the template file, resolved relative to config file
    pub fn template_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.template)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Get the index file, resolved relative to config file
    pub fn index_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.index)
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }
}
