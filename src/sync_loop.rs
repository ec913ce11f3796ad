//! The appearance follower loop.
//!
//! ```text
//!        arm ──► read last ──► (initial sync)
//!                  │
//!   ┌──────────► Idle: wait ──── Shutdown / error ──► Terminal
//!   │              │ Changed
//!   │            re-arm, read
//!   │              │
//!   │   same mode ─┤─ new mode
//!   │      │       ▼
//!   └──────┴── Reacting: materialize, launch (blocking)
//! ```
//!
//! Every wake is followed by a fresh read, and only a mode that differs
//! from the last one acted on causes work. Bursts of unrelated notifications
//! on the same key therefore cost one read each and nothing else.

use std::fmt;

use tracing::{debug, info, instrument};

use crate::appearance::{read_current_mode, AppearanceMode, AppearanceSource};
use crate::config::Strategy;
use crate::error::{Result, ResultExt};
use crate::launcher::Launcher;
use crate::logging;
use crate::materialize::{MaterializedSettings, Materializer};
use crate::theme::ThemeBindings;
use crate::watcher::{ChangeNotifier, Wake};

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Reacting,
    Terminal,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Idle => "idle",
            LoopState::Reacting => "reacting",
            LoopState::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

/// Everything the loop needs, built once at startup.
pub struct SyncContext<'a> {
    pub bindings: ThemeBindings,
    pub materializer: &'a dyn Materializer,
    pub launcher: &'a dyn Launcher,
    /// Patch the document for the starting mode before the first wait
    pub initial_sync: bool,
}

/// Counters returned when the loop ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    pub wakes: u64,
    pub no_ops: u64,
    pub reactions: u64,
    pub last_mode: AppearanceMode,
}

/// Run until shutdown.
///
/// Returns the counters on a requested shutdown, or the notification error
/// that ended the loop. Materialize and launch failures are logged and the
/// loop keeps going.
#[instrument(name = "sync_loop", skip_all)]
pub fn run_sync_loop<N, S>(ctx: &SyncContext<'_>, notifier: &mut N, source: &S) -> Result<LoopReport>
where
    N: ChangeNotifier + ?Sized,
    S: AppearanceSource + ?Sized,
{
    notifier.arm()?;

    let mut last = read_current_mode(source);
    info!(
        mode = last.as_str(),
        strategy = ctx.materializer.strategy().as_str(),
        "Following system appearance"
    );

    if ctx.initial_sync && ctx.materializer.strategy() == Strategy::Patch {
        // No launch here: the terminal picks the palette up on its next start
        if let Some(settings) = materialize(ctx, last).log_err() {
            logging::log_materialized(last, &ctx.bindings.for_mode(last).theme_name, &settings);
        }
    }

    let mut report = LoopReport {
        wakes: 0,
        no_ops: 0,
        reactions: 0,
        last_mode: last,
    };

    loop {
        enter(LoopState::Idle);
        let wake = match notifier.wait() {
            Ok(wake) => wake,
            Err(e) => {
                enter(LoopState::Terminal);
                return Err(e);
            }
        };
        if wake == Wake::Shutdown {
            enter(LoopState::Terminal);
            break;
        }
        report.wakes += 1;

        // Re-arm before reading, a change between the two must not be lost
        if let Err(e) = notifier.arm() {
            enter(LoopState::Terminal);
            return Err(e);
        }

        let current = match source.try_read() {
            Ok(mode) => mode,
            Err(e) => {
                debug!(error = %e, "Appearance unreadable after wake, treating as unchanged");
                last
            }
        };
        if current == last {
            report.no_ops += 1;
            debug!(mode = current.as_str(), "Wake without appearance change");
            continue;
        }

        logging::log_transition(last, current);
        last = current;
        report.last_mode = current;
        report.reactions += 1;

        enter(LoopState::Reacting);
        react(ctx, current);
    }

    info!(
        wakes = report.wakes,
        no_ops = report.no_ops,
        reactions = report.reactions,
        "Sync loop stopped"
    );
    Ok(report)
}

/// Apply the binding for the current mode once and launch the terminal.
///
/// A materialize failure is returned; a launch failure is only logged.
#[instrument(name = "sync_once", skip_all)]
pub fn sync_once<S>(ctx: &SyncContext<'_>, source: &S) -> Result<AppearanceMode>
where
    S: AppearanceSource + ?Sized,
{
    let mode = read_current_mode(source);
    let settings = materialize(ctx, mode)?;
    logging::log_materialized(mode, &ctx.bindings.for_mode(mode).theme_name, &settings);
    launch(ctx, &settings);
    Ok(mode)
}

fn enter(state: LoopState) {
    debug!(state = %state, "Loop state");
}

fn react(ctx: &SyncContext<'_>, mode: AppearanceMode) {
    let Some(settings) = materialize(ctx, mode).log_err() else {
        // Nothing new for the terminal to show
        return;
    };
    logging::log_materialized(mode, &ctx.bindings.for_mode(mode).theme_name, &settings);
    launch(ctx, &settings);
}

fn materialize(ctx: &SyncContext<'_>, mode: AppearanceMode) -> Result<MaterializedSettings> {
    ctx.materializer.materialize(ctx.bindings.for_mode(mode))
}

fn launch(ctx: &SyncContext<'_>, settings: &MaterializedSettings) {
    if let Some(status) = ctx.launcher.launch(settings).warn_on_err() {
        logging::log_launch(settings, &status);
    }
}

#[cfg(test)]
#[path = "sync_loop_tests.rs"]
mod tests;
