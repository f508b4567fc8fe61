//! Command implementations

pub mod check;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use deploykit_io_fs::SpecDeployConfig;
use deploykit_manifest::{load_manifest, resolve_manifest_path};

use crate::cli::ManifestArgs;

/// Working directory plus the validated manifest it points at.
pub(crate) fn load_config(args: &ManifestArgs) -> Result<(PathBuf, SpecDeployConfig)> {
    let path_cwd = args.working_dir()?;
    let path_manifest = resolve_manifest_path(&path_cwd, args.config.as_deref());
    let spec_config = load_manifest(&path_manifest)
        .with_context(|| format!("cannot load manifest {}", path_manifest.display()))?;
    Ok((path_cwd, spec_config))
}
