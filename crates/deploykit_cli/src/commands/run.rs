//! `deploykit run`: act as the build host and fire the deploy hook.

use std::process::{Command, ExitCode};

use anyhow::{Context, Result};
use clap::Args;
use deploykit_io_fs::{DeployCopyHook, LifecycleHook};
use deploykit_log::ConsoleReporter;
use tracing::{debug, info};

use crate::cli::ManifestArgs;
use crate::commands::load_config;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Report what would change without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum worker threads shared by all targets
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Build command; the deploy runs only after it exits successfully
    #[arg(last = true, value_name = "BUILD_CMD")]
    pub build_cmd: Vec<String>,
}

/// Load the manifest, run the build, then call every hook once.
///
/// The exit code reflects the build command only: deploy failures are
/// reported on the console and never fail the run.
pub fn run(args: &RunArgs, quiet: bool, no_color: bool) -> Result<ExitCode> {
    let (path_cwd, mut spec_config) = load_config(&args.manifest)?;
    if args.dry_run {
        spec_config.options.if_dry_run = true;
    }
    if args.workers.is_some() {
        spec_config.options.num_workers_max = args.workers;
    }

    let reporter = ConsoleReporter::new(no_color, quiet);
    let l_hooks: Vec<Box<dyn LifecycleHook>> = vec![Box::new(DeployCopyHook::with_reporter(
        spec_config,
        path_cwd.clone(),
        reporter,
    ))];

    if let Some((program, l_args)) = args.build_cmd.split_first() {
        info!(%program, "running build command");
        let status = Command::new(program)
            .args(l_args)
            .current_dir(&path_cwd)
            .status()
            .with_context(|| format!("cannot start build command `{program}`"))?;
        if !status.success() {
            eprintln!("Build command failed ({status}); deploy skipped.");
            return Ok(match status.code() {
                Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
                None => ExitCode::FAILURE,
            });
        }
    }

    for hook in &l_hooks {
        debug!(hook = hook.name(), "close_bundle");
        hook.close_bundle();
    }
    Ok(ExitCode::SUCCESS)
}
