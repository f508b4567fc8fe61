//! Manifest reading, parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};

use deploykit_io_fs::SpecDeployConfig;
use tracing::debug;

use crate::spec::{C_DEFAULT_MANIFEST_NAME, EnumManifestFormat, ManifestError};

/// Pick the manifest path: an explicit one (relative to `path_cwd`) or
/// [`C_DEFAULT_MANIFEST_NAME`] inside `path_cwd`.
pub fn resolve_manifest_path(path_cwd: &Path, path_manifest: Option<&Path>) -> PathBuf {
    match path_manifest {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => path_cwd.join(path),
        None => path_cwd.join(C_DEFAULT_MANIFEST_NAME),
    }
}

/// Read, parse and validate a manifest file.
pub fn load_manifest(path_manifest: &Path) -> Result<SpecDeployConfig, ManifestError> {
    let enum_format = EnumManifestFormat::from_path(path_manifest)?;
    let txt = fs::read_to_string(path_manifest).map_err(|e| ManifestError::Read {
        path: path_manifest.to_path_buf(),
        source: e,
    })?;
    let spec_config = parse_manifest(&txt, enum_format)?;
    debug!(
        path = %path_manifest.display(),
        targets = spec_config.targets.len(),
        "manifest loaded"
    );
    Ok(spec_config)
}

/// Parse manifest text in the given format and validate it.
pub fn parse_manifest(
    txt: &str,
    enum_format: EnumManifestFormat,
) -> Result<SpecDeployConfig, ManifestError> {
    let spec_config: SpecDeployConfig = match enum_format {
        EnumManifestFormat::Toml => toml::from_str(txt)?,
        EnumManifestFormat::Json => serde_json::from_str(txt)?,
    };
    validate_manifest(&spec_config)?;
    Ok(spec_config)
}

/// Reject empty paths and `preserve` entries that are not bare names.
///
/// Preserve matching is exact on a destination's direct children, so an
/// entry with a separator could never match anything.
pub fn validate_manifest(spec_config: &SpecDeployConfig) -> Result<(), ManifestError> {
    for (index, spec_target) in spec_config.targets.iter().enumerate() {
        let invalid = |message: String| ManifestError::InvalidTarget { index, message };

        if spec_target.src.trim().is_empty() {
            return Err(invalid("`src` must not be empty".to_string()));
        }
        if spec_target.dest.trim().is_empty() {
            return Err(invalid("`dest` must not be empty".to_string()));
        }
        if let Some(name) = spec_target.preserve.iter().find(|v| !_is_bare_name(v)) {
            return Err(invalid(format!(
                "`preserve` entry {name:?} is not a bare file or directory name"
            )));
        }
    }
    Ok(())
}

fn _is_bare_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
