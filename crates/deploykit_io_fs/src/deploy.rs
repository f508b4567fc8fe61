//! Per-target deploy sequence and concurrent fan-out over all targets.

use std::any::Any;
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info_span, warn};

use crate::clean::clean_destination;
use crate::copy::copy_tree_into;
use crate::report::{EnumTargetOutcome, ReportCopy, ReportCopyBuilder, ReportDeploy, ReportTarget};
use crate::reporter::DeployReporter;
use crate::spec::{
    DeployError, EnumDeploySkipReason, SpecCopyOptions, SpecDeployConfig, SpecDeployTarget,
};
use crate::util::{calculate_worker_limit, is_overlap, resolve_target_path};

/// Deploy every target of `spec_config` and wait for all of them.
///
/// Relative `src`/`dest` values resolve against `path_cwd`. Targets run
/// concurrently on one rayon pool bounded by `num_workers_max`; a failure
/// (or panic) in one target is recorded in its [`ReportTarget`] and never
/// affects the others. The returned report keeps configuration order.
pub fn run_deploy(
    spec_config: &SpecDeployConfig,
    path_cwd: &Path,
    reporter: &dyn DeployReporter,
) -> ReportDeploy {
    if spec_config.targets.is_empty() {
        return ReportDeploy::default();
    }

    let spec_cp_options = &spec_config.options;
    let n_workers_max = calculate_worker_limit(spec_cp_options.num_workers_max);
    let deploy_all = |if_parallel: bool| -> Vec<ReportTarget> {
        let run_one = |spec_target: &SpecDeployTarget| {
            deploy_target(spec_target, spec_cp_options, path_cwd, if_parallel, reporter)
        };
        if if_parallel {
            spec_config.targets.par_iter().map(run_one).collect()
        } else {
            spec_config.targets.iter().map(run_one).collect()
        }
    };

    let mut l_warnings = Vec::new();
    let l_targets = if n_workers_max <= 1 {
        deploy_all(false)
    } else {
        match ThreadPoolBuilder::new().num_threads(n_workers_max).build() {
            Ok(thread_pool) => thread_pool.install(|| deploy_all(true)),
            Err(e) => {
                let msg = format!(
                    "Failed to initialize thread pool (workers={n_workers_max}): {e}; fallback to serial deploy."
                );
                warn!("{msg}");
                l_warnings.push(msg);
                deploy_all(false)
            }
        }
    };

    ReportDeploy {
        targets: l_targets,
        warnings: l_warnings,
    }
}

/// Resolve, validate, prepare, clean, copy and report one target.
///
/// Never panics: a panic inside the sequence becomes
/// [`DeployError::Panicked`].
pub fn deploy_target(
    spec_target: &SpecDeployTarget,
    spec_cp_options: &SpecCopyOptions,
    path_cwd: &Path,
    if_parallel: bool,
    reporter: &dyn DeployReporter,
) -> ReportTarget {
    let path_src = resolve_target_path(path_cwd, &spec_target.src);
    let path_dst = resolve_target_path(path_cwd, &spec_target.dest);
    let _span = info_span!("deploy_target", dest = %path_dst.display()).entered();

    let res_guarded = catch_unwind(AssertUnwindSafe(|| {
        run_target_sequence(
            &path_src,
            &path_dst,
            &spec_target.preserve,
            spec_cp_options,
            if_parallel,
            reporter,
        )
    }));
    let outcome = match res_guarded {
        Ok(outcome) => outcome,
        Err(payload) => {
            let err = DeployError::Panicked(panic_message(payload.as_ref()));
            let _ = catch_unwind(AssertUnwindSafe(|| reporter.on_target_failed(&path_dst, &err)));
            EnumTargetOutcome::Failed(err)
        }
    };

    ReportTarget {
        path_src,
        path_dst,
        outcome,
    }
}

fn run_target_sequence(
    path_src: &Path,
    path_dst: &Path,
    l_names_preserve: &[String],
    spec_cp_options: &SpecCopyOptions,
    if_parallel: bool,
    reporter: &dyn DeployReporter,
) -> EnumTargetOutcome {
    let reason_skip = match fs::metadata(path_src) {
        Ok(meta_src) if meta_src.is_dir() => None,
        Ok(_) => Some(EnumDeploySkipReason::SourceNotDirectory),
        Err(_) => Some(EnumDeploySkipReason::SourceMissing),
    };
    if let Some(reason) = reason_skip {
        reporter.on_target_skipped(path_src, reason);
        return EnumTargetOutcome::Skipped(reason);
    }

    match clean_and_copy(
        path_src,
        path_dst,
        l_names_preserve,
        spec_cp_options,
        if_parallel,
        reporter,
    ) {
        Ok(report) => {
            reporter.on_copy_succeeded(path_src, path_dst, &report);
            EnumTargetOutcome::Deployed(report)
        }
        Err(err) => {
            reporter.on_target_failed(path_dst, &err);
            EnumTargetOutcome::Failed(err)
        }
    }
}

fn clean_and_copy(
    path_src: &Path,
    path_dst: &Path,
    l_names_preserve: &[String],
    spec_cp_options: &SpecCopyOptions,
    if_parallel: bool,
    reporter: &dyn DeployReporter,
) -> Result<ReportCopy, DeployError> {
    if is_overlap(path_src, path_dst) {
        return Err(DeployError::SourceDestinationOverlap {
            source_dir: path_src.to_path_buf(),
            destination: path_dst.to_path_buf(),
        });
    }

    let if_dry_run = spec_cp_options.if_dry_run;
    if !path_dst.exists() {
        if !if_dry_run {
            fs::create_dir_all(path_dst).map_err(|e| DeployError::DestinationInit {
                path: path_dst.to_path_buf(),
                source: e,
            })?;
        }
        reporter.on_destination_created(path_dst);
    }

    reporter.on_copy_started(path_src, path_dst);

    let mut builder_cp_report = ReportCopyBuilder::default();
    clean_destination(
        path_dst,
        l_names_preserve,
        if_parallel,
        if_dry_run,
        &mut builder_cp_report,
    )?;
    copy_tree_into(
        path_src,
        path_dst,
        spec_cp_options,
        if_parallel,
        &mut builder_cp_report,
    );

    let report = builder_cp_report.build();
    debug!("{report}");
    for warning in &report.warnings {
        reporter.on_copy_warning(path_dst, warning);
    }
    if let Some(first) = report.errors.first() {
        return Err(DeployError::CopyIncomplete {
            count: report.error_count(),
            first: first.clone(),
        });
    }
    Ok(report)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "unknown panic payload".to_string()
}
