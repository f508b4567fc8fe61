//! `deploykit check`: validate the manifest and show resolved targets.

use std::process::ExitCode;

use anyhow::Result;
use deploykit_io_fs::resolve_target_path;
use deploykit_log::Styles;
use owo_colors::OwoColorize as _;

use crate::cli::ManifestArgs;
use crate::commands::load_config;

pub fn run(args: &ManifestArgs, no_color: bool) -> Result<ExitCode> {
    let (path_cwd, spec_config) = load_config(args)?;
    let styles = Styles::for_stdout(no_color);

    if spec_config.targets.is_empty() {
        println!("{}", "No targets configured.".style(styles.dim));
        return Ok(ExitCode::SUCCESS);
    }

    for (index, spec_target) in spec_config.targets.iter().enumerate() {
        let path_src = resolve_target_path(&path_cwd, &spec_target.src);
        let path_dst = resolve_target_path(&path_cwd, &spec_target.dest);
        println!(
            "{} {} -> {}",
            format!("[{index}]").style(styles.info),
            path_src.display(),
            path_dst.display()
        );
        if !spec_target.preserve.is_empty() {
            println!(
                "    {} {}",
                "preserve:".style(styles.dim),
                spec_target.preserve.join(", ")
            );
        }
        if !path_src.is_dir() {
            println!(
                "    {}",
                "source directory does not exist yet".style(styles.warning)
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
