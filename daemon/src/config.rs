//! Verifier configuration with TOML file support.
//!
//! Key material never appears here; it is read from the environment or the
//! command line at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use boda_document::OcrConfig;
use boda_identity::IdFormat;
use boda_photo::{AuthenticityConfig, FaceMatchConfig};
use boda_store_lmdb::environment::DEFAULT_MAP_SIZE;
use boda_utils::LogFormat;
use boda_verification::ScoringConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    #[error("invalid configuration: {0}")]
    Parse(String),
    #[error("cannot serialise configuration: {0}")]
    Serialize(String),
}

/// Configuration for the `boda-verifier` binary.
///
/// Loaded from a TOML file via [`VerifierConfig::from_toml_file`]; every
/// field has a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Holds the LMDB environment under `db/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Rider directory export (JSON). Relative paths are resolved against
    /// `data_dir`.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// LMDB memory map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub id_format: IdFormat,

    #[serde(default)]
    pub authenticity: AuthenticityConfig,

    #[serde(default)]
    pub face: FaceConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Face engine wiring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// External embedding program. Unset means histogram comparison only.
    pub embedder: Option<PathBuf>,
    pub embedder_args: Vec<String>,
    /// Kill the embedder after this many milliseconds.
    pub embedder_timeout_ms: u64,
    /// Use the embedder as the authenticity analyzer's face detector.
    pub detect_with_embedder: bool,
    pub matching: FaceMatchConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./boda_data")
}

fn default_directory() -> PathBuf {
    PathBuf::from("riders.json")
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            embedder: None,
            embedder_args: Vec::new(),
            embedder_timeout_ms: 30_000,
            detect_with_embedder: false,
            matching: FaceMatchConfig::default(),
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl VerifierConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("db")
    }

    pub fn directory_path(&self) -> PathBuf {
        if self.directory.is_absolute() {
            self.directory.clone()
        } else {
            self.data_dir.join(&self.directory)
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            directory: default_directory(),
            map_size: default_map_size(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            id_format: IdFormat::default(),
            authenticity: AuthenticityConfig::default(),
            face: FaceConfig::default(),
            ocr: OcrConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}
