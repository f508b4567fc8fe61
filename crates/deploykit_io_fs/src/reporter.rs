//! Progress events emitted while deploying targets.

use std::path::Path;

use tracing::{error, info, warn};

use crate::report::ReportCopy;
use crate::spec::{DeployError, EnumDeploySkipReason};

/// Receiver for per-target progress events.
///
/// Events of one target arrive in order; events of different targets may
/// interleave and arrive from several threads.
pub trait DeployReporter: Sync {
    /// Source was unusable; the target is skipped without side effects.
    fn on_target_skipped(&self, path_src: &Path, reason: EnumDeploySkipReason);

    /// Destination did not exist and was created.
    fn on_destination_created(&self, path_dst: &Path);

    /// Cleanup and copy are about to start.
    fn on_copy_started(&self, path_src: &Path, path_dst: &Path);

    /// Source content the copy left out; sent once per warning before the
    /// target's final event.
    fn on_copy_warning(&self, path_dst: &Path, warning: &str);

    fn on_copy_succeeded(&self, path_src: &Path, path_dst: &Path, report: &ReportCopy);

    fn on_target_failed(&self, path_dst: &Path, error: &DeployError);
}

/// Reporter that forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl DeployReporter for TracingReporter {
    fn on_target_skipped(&self, path_src: &Path, reason: EnumDeploySkipReason) {
        warn!(src = %path_src.display(), ?reason, "target skipped");
    }

    fn on_destination_created(&self, path_dst: &Path) {
        info!(dest = %path_dst.display(), "destination created");
    }

    fn on_copy_started(&self, path_src: &Path, path_dst: &Path) {
        info!(src = %path_src.display(), dest = %path_dst.display(), "copy started");
    }

    fn on_copy_warning(&self, path_dst: &Path, warning: &str) {
        warn!(dest = %path_dst.display(), warning, "copy incomplete");
    }

    fn on_copy_succeeded(&self, path_src: &Path, path_dst: &Path, report: &ReportCopy) {
        info!(
            src = %path_src.display(),
            dest = %path_dst.display(),
            copied = report.cnt_copied,
            removed = report.cnt_removed,
            "copy succeeded"
        );
    }

    fn on_target_failed(&self, path_dst: &Path, error: &DeployError) {
        error!(dest = %path_dst.display(), %error, "target failed");
    }
}
