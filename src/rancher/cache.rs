// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! On-disk cache of Rancher-generated kubeconfigs.
//!
//! Generating a kubeconfig mints a new token on every call, so generated kubeconfigs
//! are kept for a short time under the user cache directory:
//!
//! ```text
//! <cache dir>/elemental-node-map/kubeconfig-<hex(sha256(key)[..16])>.yaml
//! ```
//!
//! The key is `<management URL>|<cluster ID>`. The directory is created `0700` and
//! files `0600`. Freshness is judged by file modification time. There is no locking
//! between concurrent invocations; the last writer wins.

use crate::constants::{
    kubeconfig_cache_ttl, APP_NAMESPACE, KUBECONFIG_CACHE_DIGEST_BYTES, KUBECONFIG_CACHE_PREFIX,
    KUBECONFIG_CACHE_SUFFIX,
};
use crate::errors::{CacheError, RancherError};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A fresh entry
    Hit {
        /// Cached kubeconfig
        bytes: Vec<u8>,
        /// Time since the entry was written
        age: Duration,
    },
    /// No entry for the key
    Miss,
    /// An entry older than the TTL
    Expired {
        /// Time since the entry was written
        age: Duration,
    },
}

/// Kubeconfig cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct KubeconfigCache {
    dir: PathBuf,
    ttl: Duration,
}

impl KubeconfigCache {
    /// Cache in `dir`. A zero `ttl` never expires entries.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Cache in the user cache directory (temp dir as fallback) with the default TTL.
    #[must_use]
    pub fn user_default() -> Self {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join(APP_NAMESPACE), kubeconfig_cache_ttl())
    }

    /// Cache key of a downstream cluster behind a management endpoint.
    #[must_use]
    pub fn key(management_url: &str, cluster_id: &str) -> String {
        format!("{management_url}|{cluster_id}")
    }

    /// Directory holding the entries.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        let name = format!(
            "{KUBECONFIG_CACHE_PREFIX}{}{KUBECONFIG_CACHE_SUFFIX}",
            hex(&digest[..KUBECONFIG_CACHE_DIGEST_BYTES])
        );
        self.dir.join(name)
    }

    /// Look up `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] when the entry exists but cannot be inspected or read.
    pub async fn load(&self, key: &str) -> Result<CacheLookup, CacheError> {
        let path = self.path_for(key);
        let io_error = |source: std::io::Error| CacheError::Io {
            path: path.clone(),
            source,
        };

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CacheLookup::Miss),
            Err(e) => return Err(io_error(e)),
        };
        let modified = metadata.modified().map_err(io_error)?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();

        if !self.ttl.is_zero() && age > self.ttl {
            return Ok(CacheLookup::Expired { age });
        }

        let bytes = tokio::fs::read(&path).await.map_err(io_error)?;
        Ok(CacheLookup::Hit { bytes, age })
    }

    /// Write `bytes` under `key`, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] when the directory or file cannot be written.
    pub async fn store(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o700);
        builder
            .create(&self.dir)
            .await
            .map_err(|source| CacheError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(key);
        let io_error = |source: std::io::Error| CacheError::Io {
            path: path.clone(),
            source,
        };

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&path).await.map_err(io_error)?;
        file.write_all(bytes).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;
        Ok(())
    }

    /// Return the cached kubeconfig for `key`, or run `generate` and cache its result.
    ///
    /// Cache read and write failures are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns the error of `generate`.
    pub async fn get_or_generate<F, Fut>(
        &self,
        key: &str,
        generate: F,
    ) -> Result<Vec<u8>, RancherError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, RancherError>>,
    {
        match self.load(key).await {
            Ok(CacheLookup::Hit { bytes, age }) => {
                debug!(age_secs = age.as_secs(), "Using cached kubeconfig");
                return Ok(bytes);
            }
            Ok(CacheLookup::Expired { age }) => {
                debug!(age_secs = age.as_secs(), "Cached kubeconfig expired");
            }
            Ok(CacheLookup::Miss) => debug!("No cached kubeconfig"),
            Err(e) => warn!(error = %e, "Kubeconfig cache read failed"),
        }

        let bytes = generate().await?;
        if let Err(e) = self.store(key, &bytes).await {
            warn!(error = %e, "Kubeconfig cache write failed");
        }
        Ok(bytes)
    }
}

/// Lowercase hex of `bytes`.
fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod cache_tests;
