//! Runtime configuration assembled from command-line flags.

use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use crate::assets::{AssetSource, DirAssets, EmbeddedAssets, HttpAssets};
use crate::error::{CardError, Result};

/// Default page share links point at (the asset host's index).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Where templates and fonts are read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetLocation {
    /// Compiled into the binary
    #[default]
    Embedded,
    /// A directory on disk
    Dir(PathBuf),
    /// An HTTP asset host
    Http(Url),
}

impl AssetLocation {
    /// `embedded`, an `http(s)://` URL, or a directory path.
    pub fn parse(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("embedded") {
            return Ok(Self::Embedded);
        }
        if value.starts_with("http://") || value.starts_with("https://") {
            let url = Url::parse(value)
                .map_err(|e| CardError::Fetch(format!("invalid asset URL {}: {}", value, e)))?;
            return Ok(Self::Http(url));
        }
        Ok(Self::Dir(PathBuf::from(value)))
    }

    pub fn source(&self) -> Result<Arc<dyn AssetSource>> {
        Ok(match self {
            Self::Embedded => Arc::new(EmbeddedAssets),
            Self::Dir(root) => Arc::new(DirAssets::new(root.clone())),
            Self::Http(base) => Arc::new(HttpAssets::new(base.clone())?),
        })
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub assets: AssetLocation,
    /// Page that share links and QR codes point at
    pub base_url: Url,
}

impl AppConfig {
    pub fn new(assets: Option<&str>, base_url: Option<&str>) -> Result<Self> {
        let assets = match assets {
            Some(value) => AssetLocation::parse(value)?,
            None => AssetLocation::default(),
        };
        let base = base_url.unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(base)
            .map_err(|_| CardError::MissingInput("Share base URL must be an absolute URL."))?;
        Ok(Self { assets, base_url })
    }
}
