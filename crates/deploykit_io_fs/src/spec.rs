//! Deploy specification models and top-level error types.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Symlink handling policy for the copy stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumCopySymlinkStrategy {
    /// Follow the link and copy the target bytes/entries.
    Dereference,
    /// Create a symbolic link at destination (do not copy target bytes).
    #[default]
    CopySymlinks,
    /// Ignore symlink entries.
    SkipSymlinks,
}

/// Why a target finished without touching its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumDeploySkipReason {
    /// Resolved source path does not exist.
    SourceMissing,
    /// Resolved source path exists but is not a directory.
    SourceNotDirectory,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// One `(src, dest, preserve)` deploy unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecDeployTarget {
    /// Source directory, absolute or relative to the working directory.
    pub src: String,
    /// Destination directory, absolute or relative to the working directory.
    pub dest: String,
    /// Bare names of top-level destination children kept during cleanup.
    #[serde(default)]
    pub preserve: Vec<String>,
}

impl SpecDeployTarget {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            preserve: Vec::new(),
        }
    }

    pub fn with_preserve<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preserve = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Run-wide options applied to every target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecCopyOptions {
    /// Symlink handling behavior.
    pub rule_symlink: EnumCopySymlinkStrategy,
    /// Maximum worker threads shared by all targets of a run.
    pub num_workers_max: Option<usize>,
    /// Copy access/modification times and extended attributes as well.
    pub if_preserve_metadata: bool,
    /// Do not mutate filesystem; record what would happen.
    pub if_dry_run: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            rule_symlink: EnumCopySymlinkStrategy::CopySymlinks,
            num_workers_max: None,
            if_preserve_metadata: false,
            if_dry_run: false,
        }
    }
}

/// Full deploy configuration: ordered targets plus shared options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecDeployConfig {
    #[serde(default)]
    pub targets: Vec<SpecDeployTarget>,
    #[serde(default)]
    pub options: SpecCopyOptions,
}

impl SpecDeployConfig {
    pub fn new(targets: Vec<SpecDeployTarget>) -> Self {
        Self {
            targets,
            options: SpecCopyOptions::default(),
        }
    }
}

/// One copy failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// Per-target failures. Never propagated past the hook boundary.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        source_dir.display(),
        destination.display()
    )]
    SourceDestinationOverlap {
        source_dir: PathBuf,
        destination: PathBuf,
    },
    /// Destination directory creation failed.
    #[error("Failed to create destination {}", path.display())]
    DestinationInit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Destination children could not be listed.
    #[error("Failed to read destination {}", path.display())]
    DestinationRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// One destination child could not be removed.
    #[error("Failed to remove {}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The copy stage finished with per-entry errors.
    #[error(
        "Copy finished with {count} error(s); first: {}: {}",
        first.path.display(),
        first.exception
    )]
    CopyIncomplete { count: usize, first: SpecCopyError },
    /// Target processing panicked; the payload message is kept.
    #[error("Deploy task panicked: {0}")]
    Panicked(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
