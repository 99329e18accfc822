// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pipeline configuration and the storage port it is persisted through.
//!
//! The core never touches the filesystem: front-ends supply a [`ConfigStore`]
//! (the CLI uses a directory of JSON files) and go through [`ConfigService`],
//! which owns the serialization format.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::error::StrataError;
use crate::partition::PartitionStrategy;
use crate::refit::DEFAULT_OVERLAP_THRESHOLD;

/// Store key under which [`PipelineConfig`] is persisted.
pub const CONFIG_KEY: &str = "pipeline";

/// Tunables for [`crate::FramePipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Requested number of subdomains per frame.
    pub subdomains: usize,
    /// Partitioning strategy.
    pub strategy: PartitionStrategy,
    /// Sibling overlap ratio above which a refit tree is rebuilt.
    pub overlap_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            subdomains: 4,
            strategy: PartitionStrategy::Greedy,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Checks the subdomain count against the strategy and the threshold.
    ///
    /// # Errors
    /// [`StrataError::InvalidSubdomainCount`] or [`StrataError::InvalidThreshold`].
    pub fn validate(&self) -> Result<(), StrataError> {
        self.strategy.validate(self.subdomains)?;
        if !self.overlap_threshold.is_finite() || self.overlap_threshold < 0.0 {
            return Err(StrataError::InvalidThreshold(self.overlap_threshold));
        }
        Ok(())
    }
}

/// Where pipeline settings live between runs. Bytes in, bytes out; the
/// store never interprets what it holds.
pub trait ConfigStore {
    /// Bytes saved under `key`, or [`ConfigError::NotFound`] if nothing was.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replaces whatever is saved under `key` with `data`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failure to read or write stored settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing saved under the requested key.
    #[error("config key not found")]
    NotFound,
    /// The backing medium failed.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    /// Saved bytes do not decode as the requested settings.
    #[error("config format error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The store could not be opened, e.g. no usable config directory.
    #[error("config store error: {0}")]
    Other(String),
}

/// Reads and writes typed settings as JSON through a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Gives the store back, e.g. to report where a save landed.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Decodes the settings under `key`; `Ok(None)` when nothing (or an
    /// empty file) is stored.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        let bytes = match self.store.load_raw(key) {
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Encodes `value` as pretty JSON and stores it under `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Stored [`PipelineConfig`], or the defaults when nothing is stored.
    pub fn pipeline(&self) -> Result<PipelineConfig, ConfigError> {
        Ok(self.load(CONFIG_KEY)?.unwrap_or_default())
    }
}
