//! Recursive tree copy into an existing (cleaned) destination.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::report::ReportCopyBuilder;
use crate::spec::{EnumCopySymlinkStrategy, SpecCopyOptions};
use crate::util::{
    check_dir_slot, clear_file_slot, copy_file_with_metadata, create_symbolic_link,
    should_error_broken_symlink, validate_destination_path_safety,
};

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: String,
    if_is_symlink: bool,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: String,
    if_is_symlink: bool,
}

#[derive(Debug, Clone)]
struct SpecCopyTaskFile {
    path_file_src: PathBuf,
    path_file_dst: PathBuf,
}

struct SpecCopyContext<'a> {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    spec_cp_options: &'a SpecCopyOptions,
    if_parallel: bool,
    builder_cp_report: &'a mut ReportCopyBuilder,
    set_dirs_ancestors: HashSet<(u64, u64)>,
    l_tasks_file_copy: Vec<SpecCopyTaskFile>,
}

/// Walk `path_dir_src` and mirror it under `path_dir_dst`, recording every
/// outcome in `builder_cp_report`.
///
/// Directories are created while walking; regular files are batched and
/// copied at the end (in parallel when `if_parallel`).
pub(crate) fn copy_tree_into(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_cp_options: &SpecCopyOptions,
    if_parallel: bool,
    builder_cp_report: &mut ReportCopyBuilder,
) {
    let mut spec_cp_ctx = SpecCopyContext {
        path_dir_src: path_dir_src.to_path_buf(),
        path_dir_dst: path_dir_dst.to_path_buf(),
        spec_cp_options,
        if_parallel,
        builder_cp_report,
        set_dirs_ancestors: HashSet::new(),
        l_tasks_file_copy: Vec::new(),
    };

    walk_directory(path_dir_src, &mut spec_cp_ctx);
    flush_file_copy_tasks(&mut spec_cp_ctx);
}

fn derive_destination_path(path_src: &Path, spec_cp_ctx: &SpecCopyContext<'_>) -> PathBuf {
    match path_src.strip_prefix(&spec_cp_ctx.path_dir_src) {
        Ok(path_rel) => spec_cp_ctx.path_dir_dst.join(path_rel),
        Err(_) => spec_cp_ctx
            .path_dir_dst
            .join(path_src.file_name().unwrap_or_default()),
    }
}

fn should_error_unsafe_destination_path(
    path_dst: &Path,
    spec_cp_ctx: &mut SpecCopyContext<'_>,
) -> bool {
    if let Err(message) = validate_destination_path_safety(path_dst, &spec_cp_ctx.path_dir_dst) {
        spec_cp_ctx
            .builder_cp_report
            .add_error(path_dst.to_path_buf(), message);
        return true;
    }
    false
}

fn flush_file_copy_tasks(spec_cp_ctx: &mut SpecCopyContext<'_>) {
    let l_tasks_file_copy = std::mem::take(&mut spec_cp_ctx.l_tasks_file_copy);
    if l_tasks_file_copy.is_empty() {
        return;
    }

    let if_preserve_metadata = spec_cp_ctx.spec_cp_options.if_preserve_metadata;
    let run_task = |spec_task: SpecCopyTaskFile| {
        let res_copy = clear_file_slot(&spec_task.path_file_dst).and_then(|_| {
            copy_file_with_metadata(
                &spec_task.path_file_src,
                &spec_task.path_file_dst,
                if_preserve_metadata,
            )
            .map_err(|e| e.to_string())
        });
        (spec_task.path_file_dst, res_copy)
    };

    let l_results: Vec<(PathBuf, Result<(), String>)> = if spec_cp_ctx.if_parallel {
        l_tasks_file_copy.into_par_iter().map(run_task).collect()
    } else {
        l_tasks_file_copy.into_iter().map(run_task).collect()
    };

    for (path_file_dst, res_copy) in l_results {
        match res_copy {
            Ok(()) => {
                debug!(path = %path_file_dst.display(), "copied");
                spec_cp_ctx.builder_cp_report.add_copied();
            }
            Err(msg) => spec_cp_ctx.builder_cp_report.add_error(path_file_dst, msg),
        }
    }
}

/// In dereference mode the `(dev, ino)` of every directory on the current
/// path is held in `set_dirs_ancestors`; re-entering one of them is a cycle.
/// Siblings reaching the same directory through different links are copied.
fn walk_directory(path_root: &Path, spec_cp_ctx: &mut SpecCopyContext<'_>) {
    let enum_rule_symlink = spec_cp_ctx.spec_cp_options.rule_symlink;
    if enum_rule_symlink != EnumCopySymlinkStrategy::Dereference {
        walk_directory_entries(path_root, spec_cp_ctx);
        return;
    }

    let stat_root = match fs::metadata(path_root) {
        Ok(v) => v,
        Err(e) => {
            spec_cp_ctx.builder_cp_report.add_error(
                path_root.to_path_buf(),
                format!("Failed to stat directory ({e})"),
            );
            return;
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let tuple_dirs_identifier = (stat_root.dev(), stat_root.ino());
        if !spec_cp_ctx.set_dirs_ancestors.insert(tuple_dirs_identifier) {
            spec_cp_ctx
                .builder_cp_report
                .add_warning(format!("Symlink loop detected: {}", path_root.display()));
            return;
        }
        walk_directory_entries(path_root, spec_cp_ctx);
        spec_cp_ctx.set_dirs_ancestors.remove(&tuple_dirs_identifier);
    }
    #[cfg(not(unix))]
    {
        let _ = stat_root;
        walk_directory_entries(path_root, spec_cp_ctx);
    }
}

fn walk_directory_entries(path_root: &Path, spec_cp_ctx: &mut SpecCopyContext<'_>) {
    let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();

    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            spec_cp_ctx.builder_cp_report.add_error(
                path_root.to_path_buf(),
                format!("Failed to read directory ({e})"),
            );
            return;
        }
    };

    for entry_res in iter_entries {
        let entry = match entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx.builder_cp_report.add_error(
                    path_root.to_path_buf(),
                    format!("Failed to read directory entry ({e})"),
                );
                continue;
            }
        };

        let path_entry = entry.path();
        let c_name = entry.file_name().to_string_lossy().to_string();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx
                    .builder_cp_report
                    .add_error(path_entry, format!("Failed to inspect entry ({e})"));
                continue;
            }
        };

        let b_is_symlink = cfg_file_type.is_symlink();
        let b_is_dir = cfg_file_type.is_dir() || (b_is_symlink && path_entry.is_dir());
        if b_is_dir {
            l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
                name_dir: c_name,
                if_is_symlink: b_is_symlink,
            });
        } else if cfg_file_type.is_file() || b_is_symlink {
            l_files.push(SpecFileEntry {
                path_file_src: path_entry,
                name_file: c_name,
                if_is_symlink: b_is_symlink,
            });
        } else {
            spec_cp_ctx
                .builder_cp_report
                .add_warning(format!("Special file skipped: {}", path_entry.display()));
            spec_cp_ctx.builder_cp_report.add_skipped();
        }
    }

    l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
    l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

    for dir_entry in l_dirs {
        let path_next = dir_entry.path_dir_src_sub.clone();
        if handle_dir_entry(dir_entry, spec_cp_ctx) {
            walk_directory(&path_next, spec_cp_ctx);
        }
    }

    for file_entry in l_files {
        handle_file_entry(file_entry, spec_cp_ctx);
    }
}

/// Returns whether the walk should descend into this directory.
fn handle_dir_entry(spec_dir_entry: SpecDirEntry, spec_cp_ctx: &mut SpecCopyContext<'_>) -> bool {
    spec_cp_ctx.builder_cp_report.add_scanned();

    let enum_rule_symlink = spec_cp_ctx.spec_cp_options.rule_symlink;
    let if_dry_run = spec_cp_ctx.spec_cp_options.if_dry_run;
    let path_dir_dst_sub = derive_destination_path(&spec_dir_entry.path_dir_src_sub, spec_cp_ctx);
    if should_error_unsafe_destination_path(&path_dir_dst_sub, spec_cp_ctx) {
        return false;
    }

    if spec_dir_entry.if_is_symlink {
        match enum_rule_symlink {
            EnumCopySymlinkStrategy::SkipSymlinks => {
                spec_cp_ctx.builder_cp_report.add_skipped();
                return false;
            }
            EnumCopySymlinkStrategy::CopySymlinks => {
                if if_dry_run {
                    spec_cp_ctx.builder_cp_report.add_skipped();
                    return false;
                }
                let res_link = clear_file_slot(&path_dir_dst_sub).and_then(|_| {
                    create_symbolic_link(&spec_dir_entry.path_dir_src_sub, &path_dir_dst_sub)
                        .map_err(|e| e.to_string())
                });
                match res_link {
                    Ok(()) => spec_cp_ctx.builder_cp_report.add_copied(),
                    Err(msg) => spec_cp_ctx
                        .builder_cp_report
                        .add_error(path_dir_dst_sub, msg),
                }
                return false;
            }
            EnumCopySymlinkStrategy::Dereference => {}
        }
    }

    match check_dir_slot(&path_dir_dst_sub) {
        Ok(true) => true,
        Ok(false) if if_dry_run => {
            spec_cp_ctx.builder_cp_report.add_skipped();
            true
        }
        Ok(false) => match fs::create_dir(&path_dir_dst_sub) {
            Ok(()) => {
                spec_cp_ctx.builder_cp_report.add_copied();
                true
            }
            Err(e) => {
                spec_cp_ctx
                    .builder_cp_report
                    .add_error(path_dir_dst_sub, e.to_string());
                false
            }
        },
        Err(msg) => {
            spec_cp_ctx
                .builder_cp_report
                .add_error(path_dir_dst_sub, msg);
            false
        }
    }
}

fn handle_file_entry(spec_file_entry: SpecFileEntry, spec_cp_ctx: &mut SpecCopyContext<'_>) {
    spec_cp_ctx.builder_cp_report.add_scanned();

    let enum_rule_symlink = spec_cp_ctx.spec_cp_options.rule_symlink;
    if spec_file_entry.if_is_symlink {
        if enum_rule_symlink == EnumCopySymlinkStrategy::SkipSymlinks {
            spec_cp_ctx.builder_cp_report.add_skipped();
            return;
        }

        if should_error_broken_symlink(&spec_file_entry.path_file_src, enum_rule_symlink) {
            spec_cp_ctx.builder_cp_report.add_error(
                spec_file_entry.path_file_src.clone(),
                format!(
                    "Broken symlink: {}",
                    spec_file_entry.path_file_src.display()
                ),
            );
            return;
        }
    }

    if spec_file_entry.if_is_symlink && enum_rule_symlink == EnumCopySymlinkStrategy::Dereference
    {
        match fs::metadata(&spec_file_entry.path_file_src) {
            Ok(meta_target) if meta_target.is_file() => {}
            Ok(_) => {
                spec_cp_ctx.builder_cp_report.add_warning(format!(
                    "Special file target skipped: {}",
                    spec_file_entry.path_file_src.display()
                ));
                spec_cp_ctx.builder_cp_report.add_skipped();
                return;
            }
            Err(e) => {
                spec_cp_ctx
                    .builder_cp_report
                    .add_error(spec_file_entry.path_file_src.clone(), e.to_string());
                return;
            }
        }
    }

    let path_file_dst = derive_destination_path(&spec_file_entry.path_file_src, spec_cp_ctx);
    if should_error_unsafe_destination_path(&path_file_dst, spec_cp_ctx) {
        return;
    }

    if spec_cp_ctx.spec_cp_options.if_dry_run {
        spec_cp_ctx.builder_cp_report.add_skipped();
        return;
    }

    if spec_file_entry.if_is_symlink && enum_rule_symlink == EnumCopySymlinkStrategy::CopySymlinks {
        let res_link = clear_file_slot(&path_file_dst).and_then(|_| {
            create_symbolic_link(&spec_file_entry.path_file_src, &path_file_dst)
                .map_err(|e| e.to_string())
        });
        match res_link {
            Ok(()) => spec_cp_ctx.builder_cp_report.add_copied(),
            Err(msg) => spec_cp_ctx.builder_cp_report.add_error(path_file_dst, msg),
        }
        return;
    }

    spec_cp_ctx.l_tasks_file_copy.push(SpecCopyTaskFile {
        path_file_src: spec_file_entry.path_file_src,
        path_file_dst,
    });
}
