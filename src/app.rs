//! Startup sequence shared by the binary and its tests.
//!
//! Order matters here: theme names are resolved and the materializer is built
//! before the notifier is opened, so a bad configuration never registers for
//! change notifications or touches the settings document.

use std::time::Duration;

use tracing::{info, instrument};

use crate::appearance::{AppearanceMode, AppearanceSource};
use crate::config::ResolvedConfig;
use crate::error::Result;
use crate::launcher::ProcessLauncher;
use crate::materialize::build_materializer;
use crate::sync_loop::{run_sync_loop, sync_once, LoopReport, SyncContext};
use crate::theme::resolve_bindings;
use crate::watcher::ChangeNotifier;

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// `--once`: the scheme for this mode was applied
    Applied(AppearanceMode),
    /// The loop was asked to shut down
    Stopped(LoopReport),
}

/// Resolve, build, then either apply once or follow changes until shutdown.
///
/// `open_notifier` receives the configured poll interval and is only called
/// when following changes, after every startup check has passed.
#[instrument(name = "run", skip_all, fields(once = once))]
pub fn run<S, F>(
    resolved: &ResolvedConfig,
    once: bool,
    source: &S,
    open_notifier: F,
) -> Result<RunOutcome>
where
    S: AppearanceSource + ?Sized,
    F: FnOnce(Duration) -> Result<Box<dyn ChangeNotifier>>,
{
    let bindings = resolve_bindings(&resolved.light_theme, &resolved.dark_theme)?;
    let materializer = build_materializer(resolved.strategy, &resolved.settings_path, &bindings)?;
    let launcher = ProcessLauncher::new(&resolved.terminal_path, resolved.launch_args.clone());
    let ctx = SyncContext {
        bindings,
        materializer: materializer.as_ref(),
        launcher: &launcher,
        initial_sync: resolved.initial_sync,
    };

    if once {
        let mode = sync_once(&ctx, source)?;
        info!(mode = mode.as_str(), "Applied once");
        return Ok(RunOutcome::Applied(mode));
    }

    let mut notifier = open_notifier(resolved.poll_interval)?;
    let report = run_sync_loop(&ctx, notifier.as_mut(), source)?;
    info!(
        wakes = report.wakes,
        reactions = report.reactions,
        last_mode = report.last_mode.as_str(),
        "Exiting"
    );
    Ok(RunOutcome::Stopped(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use crate::appearance::AppearanceReadError;
    use crate::config::Strategy;
    use crate::error::AutoThemeError;
    use crate::watcher::{ShutdownHandle, Wake};

    struct StoppedNotifier;

    impl ChangeNotifier for StoppedNotifier {
        fn arm(&mut self) -> Result<()> {
            Ok(())
        }

        fn wait(&mut self) -> Result<Wake> {
            Ok(Wake::Shutdown)
        }

        fn shutdown_handle(&self) -> ShutdownHandle {
            ShutdownHandle::new(Arc::new(AtomicBool::new(true)), || {})
        }
    }

    struct AlwaysDark;

    impl AppearanceSource for AlwaysDark {
        fn try_read(&self) -> std::result::Result<AppearanceMode, AppearanceReadError> {
            Ok(AppearanceMode::Dark)
        }
    }

    fn resolved(light: &str, dark: &str, strategy: Strategy) -> ResolvedConfig {
        ResolvedConfig {
            terminal_path: PathBuf::from("no-such-terminal"),
            light_theme: light.to_string(),
            dark_theme: dark.to_string(),
            settings_path: PathBuf::from("no-such-dir/ConEmu.xml"),
            strategy,
            initial_sync: false,
            launch_args: Vec::new(),
            poll_interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_unknown_theme_fails_before_notifier_opens() {
        for strategy in [Strategy::Patch, Strategy::Script] {
            let opened = Cell::new(false);
            let err = run(
                &resolved("Tomorrow", "No Such Scheme", strategy),
                false,
                &AlwaysDark,
                |_| {
                    opened.set(true);
                    Ok(Box::new(StoppedNotifier) as Box<dyn ChangeNotifier>)
                },
            )
            .unwrap_err();

            assert!(!opened.get(), "notifier opened for {:?}", strategy);
            match &err {
                AutoThemeError::ConfigResolution { theme } => assert_eq!(theme, "No Such Scheme"),
                other => panic!("expected ConfigResolution, got {:?}", other),
            }
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn test_unknown_theme_fails_under_once() {
        let err = run(
            &resolved("No Such Scheme", "Tomorrow Night", Strategy::Patch),
            true,
            &AlwaysDark,
            |_| -> Result<Box<dyn ChangeNotifier>> { panic!("notifier opened under --once") },
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_valid_config_opens_notifier_with_poll_interval() {
        let opened_with = Cell::new(None);
        let outcome = run(
            &resolved("Tomorrow", "Tomorrow Night", Strategy::Patch),
            false,
            &AlwaysDark,
            |interval| {
                opened_with.set(Some(interval));
                Ok(Box::new(StoppedNotifier) as Box<dyn ChangeNotifier>)
            },
        )
        .unwrap();

        assert_eq!(opened_with.get(), Some(Duration::from_millis(10)));
        match outcome {
            RunOutcome::Stopped(report) => {
                assert_eq!(report.wakes, 0);
                assert_eq!(report.last_mode, AppearanceMode::Dark);
            }
            other => panic!("expected Stopped, got {:?}", other),
        }
    }

    #[test]
    fn test_notifier_failure_ends_run() {
        let err = run(
            &resolved("Tomorrow", "Tomorrow Night", Strategy::Patch),
            false,
            &AlwaysDark,
            |_| Err(AutoThemeError::Notification("open failed".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, AutoThemeError::Notification(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
