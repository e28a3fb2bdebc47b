//! Configuration settings
//!
//! Settings are read from a TOML file and may be overridden from the
//! environment. Every section has defaults, so an empty file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Environment variable overriding `storage.root`
pub const ENV_STORAGE_ROOT: &str = "SLIDEX_STORAGE_ROOT";
/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "SLIDEX_LOG_LEVEL";

/// 16:9 canvas width in EMU
pub const DEFAULT_CANVAS_WIDTH: i64 = 9_144_000;
/// 16:9 canvas height in EMU
pub const DEFAULT_CANVAS_HEIGHT: i64 = 5_143_500;

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Where decks, slides and exports live
    pub storage: StorageSettings,
    /// Log output
    pub logging: LoggingSettings,
    /// Assembly defaults
    pub assembly: AssemblySettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Apply `SLIDEX_*` environment overrides
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup(ENV_STORAGE_ROOT).filter(|v| !v.is_empty()) {
            self.storage.root = PathBuf::from(root);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.logging.level = level;
        }
    }

    /// Create the storage directories if they do not exist
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            self.storage.exports_dir(),
            self.storage.slides_dir(),
            self.storage.slides_pdf_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// Storage layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// Root directory for everything slidex writes
    pub root: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
        }
    }
}

impl StorageSettings {
    /// Assembled outputs
    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }

    /// Standalone single-slide packages (`<slide_id>.pptx`)
    pub fn slides_dir(&self) -> PathBuf {
        self.root.join("slides")
    }

    /// Rendered single-page PDFs
    pub fn slides_pdf_dir(&self) -> PathBuf {
        self.root.join("slides_pdf")
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset (`info`, `slidex_pptx=debug`)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// ZIP compression for written packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompressionSetting {
    /// Deflate every entry
    #[default]
    Deflated,
    /// Store entries uncompressed
    Stored,
}

/// Assembly defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssemblySettings {
    /// Canvas width used when no source dimension is readable
    pub default_canvas_width: i64,
    /// Canvas height used when no source dimension is readable
    pub default_canvas_height: i64,
    /// Compression of written packages
    pub compression: CompressionSetting,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            default_canvas_width: DEFAULT_CANVAS_WIDTH,
            default_canvas_height: DEFAULT_CANVAS_HEIGHT,
            compression: CompressionSetting::Deflated,
        }
    }
}
