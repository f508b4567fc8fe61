//! Manifest formats and error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Manifest looked up in the working directory when none is given.
pub const C_DEFAULT_MANIFEST_NAME: &str = "deploy-copy.toml";

/// On-disk manifest syntax, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumManifestFormat {
    Toml,
    Json,
}

impl EnumManifestFormat {
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let c_ext = path
            .extension()
            .map(|v| v.to_string_lossy().to_ascii_lowercase());
        match c_ext.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(ManifestError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "Unsupported manifest format: {} (expected .toml or .json)",
        path.display()
    )]
    UnsupportedFormat { path: PathBuf },
    #[error("Invalid TOML manifest")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid JSON manifest")]
    Json(#[from] serde_json::Error),
    /// A target entry failed validation; `index` is its position in `targets`.
    #[error("targets[{index}]: {message}")]
    InvalidTarget { index: usize, message: String },
}
