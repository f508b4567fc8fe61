//! `deploykit_manifest`:
//! loading and validation of deploy manifests (TOML or JSON).
//!
//! - `spec` : manifest formats and errors
//! - `load` : read, parse and validate

pub mod load;
pub mod spec;

pub use load::{load_manifest, parse_manifest, resolve_manifest_path, validate_manifest};
pub use spec::{C_DEFAULT_MANIFEST_NAME, EnumManifestFormat, ManifestError};
