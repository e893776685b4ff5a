//! # Asset Sources
//!
//! Templates and fonts are static files addressed by relative paths such as
//! `templates/template1.svg` or `assets/HindSiliguri-Light.woff2`. Where they
//! come from is a deployment choice:
//!
//! | Source | Backing |
//! |--------|---------|
//! | [`EmbeddedAssets`] | files compiled into the binary from `public/` |
//! | [`DirAssets`] | a directory on disk |
//! | [`HttpAssets`] | an HTTP asset host (e.g. `eid-card serve`) |
//! | [`MemoryAssets`] | an in-memory map |

use async_trait::async_trait;
use include_dir::{include_dir, Dir};
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

use crate::error::{CardError, Result};

/// Assets shipped with the crate.
pub static PUBLIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/public");

/// Something that can hand out asset bytes by relative path.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the asset at `path`.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// Fetch and decode as UTF-8 text.
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let bytes = self.fetch(path).await?;
        String::from_utf8(bytes).map_err(|e| CardError::Fetch(format!("{}: {}", path, e)))
    }
}

/// Reject absolute paths and parent traversal.
fn clean_path(path: &str) -> Result<&str> {
    let path = path.split('?').next().unwrap_or(path).trim_start_matches('/');
    if path.split('/').any(|seg| seg == "..") {
        return Err(CardError::Fetch(format!("refusing path outside asset root: {}", path)));
    }
    Ok(path)
}

/// Assets compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

#[async_trait]
impl AssetSource for EmbeddedAssets {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let path = clean_path(path)?;
        PUBLIC_DIR
            .get_file(path)
            .map(|f| f.contents().to_vec())
            .ok_or_else(|| CardError::Fetch(format!("{}: not found", path)))
    }
}

/// Assets read from a directory.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for DirAssets {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let path = clean_path(path)?;
        tokio::fs::read(self.root.join(path))
            .await
            .map_err(|e| CardError::Fetch(format!("{}: {}", path, e)))
    }
}

/// Assets downloaded from an HTTP host.
#[derive(Debug, Clone)]
pub struct HttpAssets {
    client: reqwest::Client,
    base: Url,
}

impl HttpAssets {
    /// `base` is the URL the relative asset paths are joined onto.
    pub fn new(base: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("eid-card/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CardError::Fetch(format!("HTTP client error: {}", e)))?;
        Ok(Self::with_client(client, base))
    }

    pub fn with_client(client: reqwest::Client, mut base: Url) -> Self {
        // join() replaces the last segment unless the base ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { client, base }
    }
}

#[async_trait]
impl AssetSource for HttpAssets {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self
            .base
            .join(clean_path(path)?)
            .map_err(|e| CardError::Fetch(format!("{}: {}", path, e)))?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CardError::Fetch(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(CardError::Fetch(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CardError::Fetch(format!("Failed to read {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

/// Assets held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

#[async_trait]
impl AssetSource for MemoryAssets {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let path = clean_path(path)?;
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CardError::Fetch(format!("{}: not found", path)))
    }
}
