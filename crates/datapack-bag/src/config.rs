//! # Bag Configuration
//!
//! Loaded from YAML, then overlaid by environment variables:
//!
//! | variable | field |
//! |---|---|
//! | `DATAPACK_STAGING_DIR` | `staging_dir` |
//! | `DATAPACK_OUTPUT_DIR` | `output_dir` |
//! | `DATAPACK_DIGEST` | `digest` (`md5` or `sha256`) |
//!
//! ```yaml
//! staging_dir: /var/tmp/datapack
//! output_dir: /srv/bags
//! digest: md5
//! compression: deflated
//! bagging_date: 2024-05-01
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use datapack_core::DigestAlgorithm;
use serde::{Deserialize, Serialize};

use crate::error::{BagError, BagResult};

/// Environment variable overriding [`BagConfig::staging_dir`].
pub const ENV_STAGING_DIR: &str = "DATAPACK_STAGING_DIR";
/// Environment variable overriding [`BagConfig::output_dir`].
pub const ENV_OUTPUT_DIR: &str = "DATAPACK_OUTPUT_DIR";
/// Environment variable overriding [`BagConfig::digest`].
pub const ENV_DIGEST: &str = "DATAPACK_DIGEST";

/// How archive entries are compressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Deflate.
    #[default]
    Deflated,
    /// No compression.
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Self::Deflated => zip::CompressionMethod::Deflated,
            Self::Stored => zip::CompressionMethod::Stored,
        }
    }
}

/// Settings for [`BagBuilder`](crate::builder::BagBuilder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BagConfig {
    /// Parent of per-build staging directories. Defaults to the OS temp dir.
    pub staging_dir: Option<PathBuf>,
    /// Directory receiving finished archives. Defaults to the OS temp dir.
    pub output_dir: Option<PathBuf>,
    /// Manifest digest algorithm.
    pub digest: DigestAlgorithm,
    /// Archive entry compression.
    pub compression: Compression,
    /// Fixed `Bagging-Date`; today's local date when absent.
    pub bagging_date: Option<NaiveDate>,
}

impl BagConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> BagResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| BagError::Config(format!("invalid bag config: {e}")))
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> BagResult<Self> {
        let text = std::fs::read_to_string(path).map_err(BagError::io(path))?;
        Self::from_yaml_str(&text)
    }

    /// Overlay the `DATAPACK_*` environment variables.
    pub fn with_env_overrides(self) -> BagResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from `lookup`, keyed by environment variable name.
    /// Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> BagResult<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(dir) = get(ENV_STAGING_DIR) {
            self.staging_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(alg) = get(ENV_DIGEST) {
            self.digest = alg
                .parse()
                .map_err(|e: String| BagError::Config(format!("{ENV_DIGEST}: {e}")))?;
        }
        Ok(self)
    }

    /// Effective staging parent directory.
    pub fn staging_root(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Effective output directory.
    pub fn output_root(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
