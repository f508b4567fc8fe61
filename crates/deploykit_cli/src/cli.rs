//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::commands;

/// Copy build output into deploy directories once a build finishes
#[derive(Parser)]
#[command(
    name = "deploykit",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress notices (warnings and errors are still printed)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also honored: NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase diagnostic logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run an optional build command, then deploy every manifest target
    Run(commands::run::RunArgs),

    /// Validate the manifest and show resolved targets
    Check(ManifestArgs),
}

/// Where to find the manifest and how to resolve relative paths.
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Manifest file (.toml or .json) [default: deploy-copy.toml]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Resolve relative paths against DIR instead of the current directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

impl ManifestArgs {
    /// Absolute working directory; the process directory is read only here.
    pub fn working_dir(&self) -> Result<PathBuf> {
        let path_process = std::env::current_dir().context("cannot read current directory")?;
        Ok(match &self.cwd {
            Some(path) => deploykit_io_fs::resolve_target_path(
                &path_process,
                &path.to_string_lossy(),
            ),
            None => path_process,
        })
    }
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// `--no-color`, or a `NO_COLOR` variable with any value.
    pub fn is_color_disabled(&self) -> bool {
        self.no_color || std::env::var_os("NO_COLOR").is_some()
    }

    pub fn run(self) -> Result<ExitCode> {
        let no_color = self.is_color_disabled();
        match self.command {
            Command::Run(args) => commands::run::run(&args, self.quiet, no_color),
            Command::Check(args) => commands::check::run(&args, no_color),
        }
    }
}
