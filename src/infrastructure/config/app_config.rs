//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;

pub(crate) const APP_NAME: &str = "beer-gallery";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration from the config file and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Base URL of the listing service, without the `/api/images` path.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Enable mouse support.
    #[serde(default = "default_true")]
    pub mouse: bool,

    /// Grid configuration.
    #[serde(default)]
    pub grid: GridConfig,

    /// Image pipeline configuration.
    #[serde(default)]
    pub images: ImagesConfig,
}

/// Grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Minimum card width in columns; the grid fits as many as the terminal allows.
    #[serde(default = "default_min_card_width")]
    pub min_card_width: u16,

    /// Lines from the bottom at which the next page is fetched.
    #[serde(default = "default_load_threshold")]
    pub load_threshold: u16,

    /// Show the beer name under each card.
    #[serde(default = "default_true")]
    pub show_captions: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_card_width: default_min_card_width(),
            load_threshold: default_load_threshold(),
            show_captions: true,
        }
    }
}

/// Image loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Maximum decoded images kept in memory.
    #[serde(default = "default_memory_cache_size")]
    pub memory_cache_size: usize,

    /// Maximum disk cache size in megabytes.
    #[serde(default = "default_disk_cache_mb")]
    pub disk_cache_mb: u64,

    /// Maximum concurrent downloads.
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Width in pixels that thumbnails are downscaled to.
    #[serde(default = "default_thumbnail_width")]
    pub thumbnail_width: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            memory_cache_size: default_memory_cache_size(),
            disk_cache_mb: default_disk_cache_mb(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
            timeout_secs: default_timeout_secs(),
            thumbnail_width: default_thumbnail_width(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_min_card_width() -> u16 {
    28
}

fn default_load_threshold() -> u16 {
    crate::application::services::DEFAULT_LOAD_THRESHOLD
}

fn default_memory_cache_size() -> usize {
    80
}

fn default_disk_cache_mb() -> u64 {
    200
}

fn default_max_concurrent_downloads() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_thumbnail_width() -> u32 {
    400
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(api_url) = args.api_url {
            self.api_url = api_url;
        }
        if let Some(mouse) = args.mouse {
            self.mouse = mouse;
        }
        if let Some(min_card_width) = args.min_card_width {
            self.grid.min_card_width = min_card_width;
        }
        if let Some(show_captions) = args.show_captions {
            self.grid.show_captions = show_captions;
        }
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("beer-gallery.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }

    /// Disk cache limit in bytes.
    #[must_use]
    pub const fn disk_cache_bytes(&self) -> u64 {
        self.images.disk_cache_mb * 1024 * 1024
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            api_url: default_api_url(),
            log_level: LogLevel::Info,
            mouse: true,
            grid: GridConfig::default(),
            images: ImagesConfig::default(),
        }
    }
}
