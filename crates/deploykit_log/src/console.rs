//! Color-coded console lines for deploy progress.

use std::error::Error as _;
use std::path::Path;

use deploykit_io_fs::{DeployError, DeployReporter, EnumDeploySkipReason, ReportCopy};
use owo_colors::OwoColorize as _;

use crate::styles::Styles;

const C_PREFIX: &str = "[deploy-copy]";

/// [`DeployReporter`] printing one human-readable line per event.
///
/// Notices go to stdout and are suppressed by `quiet`; warnings and errors
/// go to stderr and are always printed.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    /// Styles for stdout notices.
    pub styles_out: Styles,
    /// Styles for stderr warnings and failures.
    pub styles_err: Styles,
    pub quiet: bool,
}

impl ConsoleReporter {
    /// Each stream is colored only when it is a terminal and `NO_COLOR` is unset.
    pub fn new(no_color: bool, quiet: bool) -> Self {
        Self {
            styles_out: Styles::for_stdout(no_color),
            styles_err: Styles::for_stderr(no_color),
            quiet,
        }
    }

    pub fn plain(quiet: bool) -> Self {
        Self {
            styles_out: Styles::default(),
            styles_err: Styles::default(),
            quiet,
        }
    }

    pub fn format_skipped(&self, path_src: &Path, reason: EnumDeploySkipReason) -> String {
        let msg = match reason {
            EnumDeploySkipReason::SourceMissing => format!(
                "{C_PREFIX} Source directory {} does not exist. Skipping.",
                path_src.display()
            ),
            EnumDeploySkipReason::SourceNotDirectory => format!(
                "{C_PREFIX} Source {} is not a directory. Skipping.",
                path_src.display()
            ),
        };
        msg.style(self.styles_err.warning).to_string()
    }

    /// Content the copy left out (special files, symlink cycles).
    pub fn format_copy_warning(&self, path_dst: &Path, warning: &str) -> String {
        format!("{C_PREFIX} Warning ({}): {warning}", path_dst.display())
            .style(self.styles_err.warning)
            .to_string()
    }

    pub fn format_destination_created(&self, path_dst: &Path) -> String {
        format!(
            "{C_PREFIX} Destination {} does not exist. Creating...",
            path_dst.display()
        )
        .style(self.styles_out.dim)
        .to_string()
    }

    pub fn format_copy_started(&self, path_src: &Path, path_dst: &Path) -> String {
        format!(
            "{C_PREFIX} Copying from {} to {}...",
            path_src.display(),
            path_dst.display()
        )
        .style(self.styles_out.info)
        .to_string()
    }

    pub fn format_copy_succeeded(&self, path_src: &Path, path_dst: &Path) -> String {
        format!(
            "{C_PREFIX} Success: {} -> {}",
            path_src.display(),
            path_dst.display()
        )
        .style(self.styles_out.success)
        .to_string()
    }

    /// Headline plus the error and its source chain.
    pub fn format_target_failed(&self, path_dst: &Path, error: &DeployError) -> String {
        let mut detail = error.to_string();
        let mut source = error.source();
        while let Some(err) = source {
            let txt = err.to_string();
            if !detail.contains(&txt) {
                detail.push_str(": ");
                detail.push_str(&txt);
            }
            source = err.source();
        }
        format!(
            "{C_PREFIX} Failed to copy to {}\n{C_PREFIX}   {detail}",
            path_dst.display()
        )
        .style(self.styles_err.error)
        .to_string()
    }
}

impl DeployReporter for ConsoleReporter {
    fn on_target_skipped(&self, path_src: &Path, reason: EnumDeploySkipReason) {
        eprintln!("{}", self.format_skipped(path_src, reason));
    }

    fn on_destination_created(&self, path_dst: &Path) {
        if !self.quiet {
            println!("{}", self.format_destination_created(path_dst));
        }
    }

    fn on_copy_started(&self, path_src: &Path, path_dst: &Path) {
        if !self.quiet {
            println!("{}", self.format_copy_started(path_src, path_dst));
        }
    }

    fn on_copy_warning(&self, path_dst: &Path, warning: &str) {
        eprintln!("{}", self.format_copy_warning(path_dst, warning));
    }

    fn on_copy_succeeded(&self, path_src: &Path, path_dst: &Path, _report: &ReportCopy) {
        if !self.quiet {
            println!("{}", self.format_copy_succeeded(path_src, path_dst));
        }
    }

    fn on_target_failed(&self, path_dst: &Path, error: &DeployError) {
        eprintln!("{}", self.format_target_failed(path_dst, error));
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::{Path, PathBuf};

    use deploykit_io_fs::{DeployError, EnumDeploySkipReason};

    use super::ConsoleReporter;
    use crate::styles::Styles;

    #[test]
    fn plain_lines_match_expected_text() {
        let reporter = ConsoleReporter::plain(false);
        let src = Path::new("/app/dist");
        let dst = Path::new("/srv/www");

        assert_eq!(
            reporter.format_skipped(src, EnumDeploySkipReason::SourceMissing),
            "[deploy-copy] Source directory /app/dist does not exist. Skipping."
        );
        assert_eq!(
            reporter.format_destination_created(dst),
            "[deploy-copy] Destination /srv/www does not exist. Creating..."
        );
        assert_eq!(
            reporter.format_copy_started(src, dst),
            "[deploy-copy] Copying from /app/dist to /srv/www..."
        );
        assert_eq!(
            reporter.format_copy_succeeded(src, dst),
            "[deploy-copy] Success: /app/dist -> /srv/www"
        );
    }

    #[test]
    fn failure_line_includes_underlying_error() {
        let reporter = ConsoleReporter::plain(true);
        let err = DeployError::Clean {
            path: PathBuf::from("/srv/www/old"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        };
        let txt = reporter.format_target_failed(Path::new("/srv/www"), &err);
        assert_eq!(
            txt,
            "[deploy-copy] Failed to copy to /srv/www\n\
             [deploy-copy]   Failed to remove /srv/www/old: Permission denied"
        );
    }

    #[test]
    fn copy_warning_line_names_destination() {
        let reporter = ConsoleReporter::plain(true);
        assert_eq!(
            reporter.format_copy_warning(
                Path::new("/srv/www"),
                "Special file skipped: /app/dist/pipe"
            ),
            "[deploy-copy] Warning (/srv/www): Special file skipped: /app/dist/pipe"
        );
    }

    #[test]
    fn streams_are_styled_independently() {
        let reporter = ConsoleReporter {
            styles_out: Styles::colored(),
            styles_err: Styles::default(),
            quiet: false,
        };
        let txt = reporter.format_copy_succeeded(Path::new("/a"), Path::new("/b"));
        assert!(txt.starts_with("\u{1b}["));
        assert!(txt.contains("Success: /a -> /b"));

        let txt = reporter.format_skipped(Path::new("/a"), EnumDeploySkipReason::SourceMissing);
        assert!(!txt.contains('\u{1b}'));
        let err = DeployError::Panicked("boom".to_string());
        assert!(!reporter.format_target_failed(Path::new("/b"), &err).contains('\u{1b}'));
    }
}
