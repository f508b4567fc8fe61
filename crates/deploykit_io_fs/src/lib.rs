//! `deploykit_io_fs`:
//! post-build deploy engine copying source trees into destinations.
//!
//! Modules:
//! - `deploy`   : per-target sequence and concurrent fan-out
//! - `clean`    : selective destination cleanup (preserve set)
//! - `copy`     : recursive merge-copy with overwrite
//! - `hook`     : lifecycle hook a build host calls once
//! - `reporter` : progress event seam
//! - `spec`     : configuration models and errors
//! - `report`   : run-time report model
//! - `util`     : shared helper functions

pub mod clean;
mod copy;
pub mod deploy;
pub mod hook;
pub mod report;
pub mod reporter;
pub mod spec;
mod util;

pub use clean::clean_destination;
pub use deploy::{deploy_target, run_deploy};
pub use hook::{C_HOOK_NAME, DeployCopyHook, LifecycleHook};
pub use report::{EnumTargetOutcome, ReportCopy, ReportCopyBuilder, ReportDeploy, ReportTarget};
pub use reporter::{DeployReporter, TracingReporter};
pub use spec::{
    DeployError, EnumCopySymlinkStrategy, EnumDeploySkipReason, SpecCopyError, SpecCopyOptions,
    SpecDeployConfig, SpecDeployTarget,
};
pub use util::resolve_target_path;
