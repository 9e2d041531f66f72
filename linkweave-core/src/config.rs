//! Configuration parsing and management.

use crate::registry::LinkMappings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://cyberpath-hq.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid base URL {0:?}: {1}")]
    InvalidBaseUrl(String, url::ParseError),
}

/// Main configuration struct matching the linkweave.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub auto_link: AutoLinkConfig,

    #[serde(default)]
    pub utm: UtmConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix for article URLs
    #[serde(default = "default_blog_path")]
    pub blog_path: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_blog_path() -> String {
    String::from("/blog")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            blog_path: default_blog_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_content_dir")]
    pub content: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("src/content/blog")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist/linked")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: default_content_dir(),
            output: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLinkConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_links")]
    pub max_links_per_term: usize,

    #[serde(default)]
    pub exclude_terms: Vec<String>,

    #[serde(default)]
    pub exclude_urls: Vec<String>,

    /// Extra YAML mapping file merged over the built-in table
    #[serde(default)]
    pub mappings_file: Option<PathBuf>,

    #[serde(default)]
    pub custom_mappings: LinkMappings,
}

fn default_true() -> bool {
    true
}

fn default_max_links() -> usize {
    1
}

impl Default for AutoLinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_links_per_term: default_max_links(),
            exclude_terms: Vec::new(),
            exclude_urls: Vec::new(),
            mappings_file: None,
            custom_mappings: LinkMappings::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtmConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Defaults to the host of `site.base_url`
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default = "default_medium")]
    pub medium: String,

    /// Front-matter field used as utm_campaign
    #[serde(default = "default_campaign_field")]
    pub campaign_field: String,

    #[serde(default)]
    pub exclude_domains: Vec<String>,
}

fn default_medium() -> String {
    String::from("blog")
}

fn default_campaign_field() -> String {
    String::from("title")
}

impl Default for UtmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: None,
            medium: default_medium(),
            campaign_field: default_campaign_field(),
            exclude_domains: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults rooted
    /// at the current directory
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Check fields that cannot be validated by deserialization alone
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.site.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(self.site.base_url.clone(), e))?;
        Ok(())
    }

    /// Content directory, resolved relative to the config file
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.content)
    }

    /// Output directory, resolved relative to the config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Optional mappings overlay file, resolved relative to the config file
    pub fn mappings_file(&self) -> Option<PathBuf> {
        self.auto_link
            .mappings_file
            .as_ref()
            .map(|p| self.resolve_path(p))
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.as_ref().and_then(|p| p.parent()) {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }
}
