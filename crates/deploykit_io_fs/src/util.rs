use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::spec::EnumCopySymlinkStrategy;

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Resolve `raw` against `path_cwd` and fold `.`/`..` lexically.
///
/// Absolute inputs ignore `path_cwd`. No filesystem access happens here, so
/// the result is stable for paths that do not exist yet.
pub fn resolve_target_path(path_cwd: &Path, raw: &str) -> PathBuf {
    let path_raw = Path::new(raw);
    if path_raw.is_absolute() {
        return _normalize_lexically(path_raw);
    }
    _normalize_lexically(&path_cwd.join(path_raw))
}

fn _normalize_lexically(path: &Path) -> PathBuf {
    let mut path_out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let component_last = path_out.components().next_back();
                let b_can_pop = matches!(component_last, Some(Component::Normal(_)));
                let b_at_root = matches!(
                    component_last,
                    Some(Component::RootDir | Component::Prefix(_))
                );
                if b_can_pop {
                    path_out.pop();
                } else if !b_at_root {
                    path_out.push("..");
                }
            }
            other => path_out.push(other.as_os_str()),
        }
    }
    path_out
}

/// Canonicalize the longest existing prefix and re-append the rest.
fn _canonicalize_lenient(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => _canonicalize_lenient(parent).join(name),
        _ => path.to_path_buf(),
    }
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _canonicalize_lenient(src);
    let dst_resolved = _canonicalize_lenient(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

/// Refuse destination items whose parent chain leaves `path_dir_dst_root`
/// or passes through a symlink below it.
pub(crate) fn validate_destination_path_safety(
    path_dst_item: &Path,
    path_dir_dst_root: &Path,
) -> Result<(), String> {
    if !path_dst_item.starts_with(path_dir_dst_root) {
        return Err(format!(
            "Unsafe destination path escapes destination root: {} (root={})",
            path_dst_item.display(),
            path_dir_dst_root.display()
        ));
    }

    let Some(path_parent_dst) = path_dst_item.parent() else {
        return Err(format!(
            "Failed to derive parent directory: {}",
            path_dst_item.display()
        ));
    };
    let Ok(path_parent_rel) = path_parent_dst.strip_prefix(path_dir_dst_root) else {
        return Err(format!(
            "Unsafe destination parent escapes destination root: {} (root={})",
            path_dst_item.display(),
            path_dir_dst_root.display()
        ));
    };

    let mut path_cursor = path_dir_dst_root.to_path_buf();
    for part_rel in path_parent_rel.components() {
        path_cursor.push(part_rel.as_os_str());
        match fs::symlink_metadata(&path_cursor) {
            Ok(meta_cursor) if meta_cursor.file_type().is_symlink() => {
                return Err(format!(
                    "Unsafe destination path traverses symlink component: {}",
                    path_cursor.display()
                ));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(format!(
                    "Failed to inspect destination path component {} ({e})",
                    path_cursor.display()
                ));
            }
        }
    }

    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EntryOperations

/// Remove a file, symlink or directory tree. Already-missing paths are fine.
pub(crate) fn remove_entry_forced(path: &Path) -> io::Result<()> {
    let meta_entry = match fs::symlink_metadata(path) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let file_type = meta_entry.file_type();
    let res_remove = if file_type.is_dir() {
        fs::remove_dir_all(path)
    } else if cfg!(windows) && file_type.is_symlink() && path.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    match res_remove {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Make `path_dst` writable for a file or link: drop an existing symlink or
/// file there, refuse to replace a directory.
pub(crate) fn clear_file_slot(path_dst: &Path) -> Result<(), String> {
    match fs::symlink_metadata(path_dst) {
        Ok(meta_dst) if meta_dst.file_type().is_symlink() => {
            fs::remove_file(path_dst).map_err(|e| e.to_string())
        }
        Ok(meta_dst) if meta_dst.is_dir() => Err(format!(
            "Destination is a directory: {}",
            path_dst.display()
        )),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Make `path_dst` usable as a directory: existing directories merge, a
/// file or symlink in the way is an error.
pub(crate) fn check_dir_slot(path_dst: &Path) -> Result<bool, String> {
    match fs::symlink_metadata(path_dst) {
        Ok(meta_dst) if meta_dst.is_dir() => Ok(true),
        Ok(_) => Err(format!(
            "Destination is not a directory: {}",
            path_dst.display()
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.to_string()),
    }
}

pub(crate) fn should_error_broken_symlink(
    path_symlink: &Path,
    rule_symlink: EnumCopySymlinkStrategy,
) -> bool {
    rule_symlink == EnumCopySymlinkStrategy::Dereference && !path_symlink.exists()
}

pub(crate) fn create_symbolic_link(path_src: &Path, path_dst: &Path) -> io::Result<()> {
    let target = fs::read_link(path_src)?;

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target, path_dst)
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        if path_src.is_dir() {
            symlink_dir(&target, path_dst)
        } else {
            symlink_file(&target, path_dst)
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, path_dst);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Symbolic links are unsupported on this platform",
        ))
    }
}

pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_preserve_metadata: bool,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    if if_preserve_metadata {
        apply_file_times(path_file_src, path_file_dst)?;
        #[cfg(target_os = "linux")]
        copy_xattrs_linux(path_file_src, path_file_dst);
    }
    Ok(())
}

fn apply_file_times(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{
        calculate_worker_limit, is_overlap, remove_entry_forced, resolve_target_path,
        validate_destination_path_safety,
    };

    #[test]
    fn resolve_keeps_absolute_and_joins_relative() {
        let cwd = Path::new("/work/app");
        assert_eq!(
            resolve_target_path(cwd, "/srv/www"),
            PathBuf::from("/srv/www")
        );
        assert_eq!(
            resolve_target_path(cwd, "dist"),
            PathBuf::from("/work/app/dist")
        );
    }

    #[test]
    fn resolve_folds_dot_components() {
        let cwd = Path::new("/work/app");
        assert_eq!(
            resolve_target_path(cwd, "./build/../dist/"),
            PathBuf::from("/work/app/dist")
        );
        assert_eq!(
            resolve_target_path(cwd, "../../../deploy"),
            PathBuf::from("/deploy")
        );
    }

    #[test]
    fn overlap_detects_nesting_both_ways() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("site");
        std::fs::create_dir_all(&src).expect("create src");

        assert!(is_overlap(&src, &src.join("out")));
        assert!(is_overlap(&src.join("out"), &src));
        assert!(!is_overlap(&src, &tmp.path().join("site-out")));
    }

    #[cfg(unix)]
    #[test]
    fn safety_rejects_symlinked_parent() {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().join("dst");
        let outside = tmp.path().join("outside");
        std::fs::create_dir_all(&root).expect("create root");
        std::fs::create_dir_all(&outside).expect("create outside");
        symlink(&outside, root.join("link")).expect("symlink");

        assert!(validate_destination_path_safety(&root.join("a/b.txt"), &root).is_ok());
        let err = validate_destination_path_safety(&root.join("link/b.txt"), &root)
            .expect_err("symlinked parent must be refused");
        assert!(err.contains("symlink component"));
        assert!(validate_destination_path_safety(&tmp.path().join("x.txt"), &root).is_err());
    }

    #[test]
    fn remove_entry_forced_tolerates_missing_paths() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("tree");
        std::fs::create_dir_all(dir.join("a/b")).expect("create tree");
        std::fs::write(dir.join("a/b/c.txt"), "c").expect("write");

        remove_entry_forced(&dir).expect("remove tree");
        assert!(!dir.exists());
        remove_entry_forced(&dir).expect("second removal is a no-op");
    }

    #[test]
    fn worker_limit_is_at_least_one() {
        assert_eq!(calculate_worker_limit(Some(0)), 1);
        assert_eq!(calculate_worker_limit(Some(1)), 1);
        assert!(calculate_worker_limit(None) >= 1);
    }
}
