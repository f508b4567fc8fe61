//! Selective cleanup of a destination directory's top level.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::report::ReportCopyBuilder;
use crate::spec::DeployError;
use crate::util::remove_entry_forced;

/// Remove every immediate child of `path_dir_dst` whose bare name is not in
/// `l_names_preserve`.
///
/// Preserved children are left untouched together with their contents.
/// Matching is exact on the entry name; nested paths never match. Children
/// that vanish before removal are not errors. When `if_parallel` is set the
/// removals run on the current rayon pool.
///
/// The first removal failure is returned; the remaining removals still run.
pub fn clean_destination(
    path_dir_dst: &Path,
    l_names_preserve: &[String],
    if_parallel: bool,
    if_dry_run: bool,
    builder_cp_report: &mut ReportCopyBuilder,
) -> Result<(), DeployError> {
    let set_names_preserve: HashSet<&OsStr> =
        l_names_preserve.iter().map(OsStr::new).collect();

    let iter_entries = match fs::read_dir(path_dir_dst) {
        Ok(iter) => iter,
        Err(e) if if_dry_run && e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(DeployError::DestinationRead {
                path: path_dir_dst.to_path_buf(),
                source: e,
            });
        }
    };

    let mut l_paths_remove: Vec<PathBuf> = Vec::new();
    for entry_res in iter_entries {
        let entry = entry_res.map_err(|e| DeployError::DestinationRead {
            path: path_dir_dst.to_path_buf(),
            source: e,
        })?;
        if set_names_preserve.contains(entry.file_name().as_os_str()) {
            debug!(path = %entry.path().display(), "preserved");
            builder_cp_report.add_preserved();
            continue;
        }
        l_paths_remove.push(entry.path());
    }

    if if_dry_run {
        for path_entry in l_paths_remove {
            debug!(path = %path_entry.display(), "would remove");
            builder_cp_report.add_skipped();
        }
        return Ok(());
    }

    let remove_one = |path_entry: PathBuf| {
        let res_remove = remove_entry_forced(&path_entry);
        (path_entry, res_remove)
    };
    let l_results: Vec<(PathBuf, io::Result<()>)> = if if_parallel {
        l_paths_remove.into_par_iter().map(remove_one).collect()
    } else {
        l_paths_remove.into_iter().map(remove_one).collect()
    };

    let mut err_first: Option<DeployError> = None;
    for (path_entry, res_remove) in l_results {
        match res_remove {
            Ok(()) => {
                debug!(path = %path_entry.display(), "removed");
                builder_cp_report.add_removed();
            }
            Err(source) => {
                debug!(path = %path_entry.display(), error = %source, "remove failed");
                if err_first.is_none() {
                    err_first = Some(DeployError::Clean {
                        path: path_entry,
                        source,
                    });
                }
            }
        }
    }

    match err_first {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
