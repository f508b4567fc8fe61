//! Deploy report models and mutable report builder.

use std::fmt;
use std::path::PathBuf;

use crate::spec::{DeployError, EnumDeploySkipReason, SpecCopyError};

/// Aggregate counters and diagnostics for one target's clean + copy.
#[derive(Debug, Default, Clone)]
pub struct ReportCopy {
    /// Total scanned source entries.
    pub cnt_scanned: u64,
    /// Number of copied entries successfully committed.
    pub cnt_copied: u64,
    /// Number of destination children removed by cleanup.
    pub cnt_removed: u64,
    /// Number of destination children kept by the preserve set.
    pub cnt_preserved: u64,
    /// Number of entries skipped by strategy or dry-run.
    pub cnt_skipped: u64,
    /// Non-fatal warnings collected during traversal/copy.
    pub warnings: Vec<String>,
    /// Per-entry failures.
    pub errors: Vec<SpecCopyError>,
}

impl ReportCopy {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} copied={} removed={} preserved={} skipped={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_copied,
            self.cnt_removed,
            self.cnt_preserved,
            self.cnt_skipped,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[deploy-copy]"))
    }
}

/// Mutable accumulator for clean/copy statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    cnt_scanned: u64,
    cnt_copied: u64,
    cnt_removed: u64,
    cnt_preserved: u64,
    cnt_skipped: u64,
    errors: Vec<SpecCopyError>,
    warnings: Vec<String>,
}

impl ReportCopyBuilder {
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    pub fn add_removed(&mut self) {
        self.cnt_removed += 1;
    }

    pub fn add_preserved(&mut self) {
        self.cnt_preserved += 1;
    }

    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.errors.push(SpecCopyError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCopy {
        ReportCopy {
            cnt_scanned: self.cnt_scanned,
            cnt_copied: self.cnt_copied,
            cnt_removed: self.cnt_removed,
            cnt_preserved: self.cnt_preserved,
            cnt_skipped: self.cnt_skipped,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

/// Terminal state of one target.
#[derive(Debug)]
pub enum EnumTargetOutcome {
    /// Cleanup and copy completed.
    Deployed(ReportCopy),
    /// Source was unusable; nothing was touched.
    Skipped(EnumDeploySkipReason),
    /// A filesystem step failed after validation.
    Failed(DeployError),
}

/// Resolved paths plus outcome for one target.
#[derive(Debug)]
pub struct ReportTarget {
    pub path_src: PathBuf,
    pub path_dst: PathBuf,
    pub outcome: EnumTargetOutcome,
}

impl ReportTarget {
    pub fn is_deployed(&self) -> bool {
        matches!(self.outcome, EnumTargetOutcome::Deployed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, EnumTargetOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, EnumTargetOutcome::Failed(_))
    }
}

/// Outcomes of one hook invocation, in configuration order.
#[derive(Debug, Default)]
pub struct ReportDeploy {
    pub targets: Vec<ReportTarget>,
    /// Run-level warnings (e.g. thread pool fallback).
    pub warnings: Vec<String>,
}

impl ReportDeploy {
    pub fn cnt_deployed(&self) -> usize {
        self.targets.iter().filter(|t| t.is_deployed()).count()
    }

    pub fn cnt_skipped(&self) -> usize {
        self.targets.iter().filter(|t| t.is_skipped()).count()
    }

    pub fn cnt_failed(&self) -> usize {
        self.targets.iter().filter(|t| t.is_failed()).count()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} targets={} deployed={} skipped={} failed={}",
            self.targets.len(),
            self.cnt_deployed(),
            self.cnt_skipped(),
            self.cnt_failed()
        )
    }
}

impl fmt::Display for ReportDeploy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[deploy-copy]"))
    }
}
