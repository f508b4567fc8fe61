//! Build lifecycle hook that runs the deploy once the host finished writing.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::deploy::run_deploy;
use crate::report::ReportDeploy;
use crate::reporter::{DeployReporter, TracingReporter};
use crate::spec::SpecDeployConfig;

/// Name under which [`DeployCopyHook`] registers with a host.
pub const C_HOOK_NAME: &str = "deploy-copy";

/// Single entry point a build host calls after its output is on disk.
///
/// Implementations must not panic and have no way to fail the host.
pub trait LifecycleHook: Send + Sync {
    fn name(&self) -> &str;

    /// Called exactly once, after the host finished writing its artifacts.
    fn close_bundle(&self);
}

/// Deploy-copy hook. Configuration, working directory and reporter are
/// captured when the hook is built; `close_bundle` takes no input.
pub struct DeployCopyHook<R = TracingReporter> {
    spec_config: SpecDeployConfig,
    path_cwd: PathBuf,
    reporter: R,
}

impl DeployCopyHook<TracingReporter> {
    /// Hook resolving relative targets against the process working directory.
    pub fn new(spec_config: SpecDeployConfig) -> Self {
        let path_cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_reporter(spec_config, path_cwd, TracingReporter)
    }
}

impl<R: DeployReporter> DeployCopyHook<R> {
    pub fn with_reporter(spec_config: SpecDeployConfig, path_cwd: PathBuf, reporter: R) -> Self {
        Self {
            spec_config,
            path_cwd,
            reporter,
        }
    }

    pub fn config(&self) -> &SpecDeployConfig {
        &self.spec_config
    }

    pub fn cwd(&self) -> &Path {
        &self.path_cwd
    }

    /// Run every target and return the collected outcomes.
    pub fn run(&self) -> ReportDeploy {
        run_deploy(&self.spec_config, &self.path_cwd, &self.reporter)
    }
}

impl<R: DeployReporter + Send> LifecycleHook for DeployCopyHook<R> {
    fn name(&self) -> &str {
        C_HOOK_NAME
    }

    fn close_bundle(&self) {
        let report = self.run();
        for msg in &report.warnings {
            warn!("{msg}");
        }
        debug!("{report}");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{C_HOOK_NAME, DeployCopyHook, LifecycleHook};
    use crate::reporter::TracingReporter;
    use crate::spec::{SpecDeployConfig, SpecDeployTarget};

    #[test]
    fn close_bundle_runs_captured_configuration() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(tmp.path().join("dist/assets")).expect("create dist");
        fs::write(tmp.path().join("dist/index.html"), "<html>").expect("write");
        fs::write(tmp.path().join("dist/assets/app.js"), "js").expect("write");
        fs::create_dir_all(tmp.path().join("deploy-result")).expect("create dest");
        fs::write(tmp.path().join("deploy-result/.gitkeep"), "").expect("write");

        let spec_config = SpecDeployConfig::new(vec![
            SpecDeployTarget::new("dist", "deploy-result").with_preserve([".gitkeep"]),
        ]);
        let hook =
            DeployCopyHook::with_reporter(spec_config, tmp.path().to_path_buf(), TracingReporter);
        assert_eq!(hook.name(), C_HOOK_NAME);

        let l_hooks: Vec<Box<dyn LifecycleHook>> = vec![Box::new(hook)];
        for hook in &l_hooks {
            hook.close_bundle();
        }

        let dest = tmp.path().join("deploy-result");
        assert!(dest.join(".gitkeep").exists());
        assert_eq!(
            fs::read_to_string(dest.join("index.html")).expect("read"),
            "<html>"
        );
        assert!(dest.join("assets/app.js").exists());
    }

    #[test]
    fn close_bundle_swallows_failures() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(tmp.path().join("dist")).expect("create dist");
        fs::write(tmp.path().join("blocked"), "file").expect("write");

        let spec_config = SpecDeployConfig::new(vec![
            SpecDeployTarget::new("missing", "out"),
            SpecDeployTarget::new("dist", "blocked"),
        ]);
        let hook =
            DeployCopyHook::with_reporter(spec_config, tmp.path().to_path_buf(), TracingReporter);
        hook.close_bundle();

        assert!(!tmp.path().join("out").exists());
        let report = hook.run();
        assert_eq!(report.cnt_skipped(), 1);
        assert_eq!(report.cnt_failed(), 1);
    }

    #[test]
    fn new_uses_process_working_directory() {
        let hook = DeployCopyHook::new(SpecDeployConfig::default());
        assert_eq!(hook.cwd(), std::env::current_dir().expect("cwd").as_path());
        assert!(hook.config().targets.is_empty());
        hook.close_bundle();
    }
}
