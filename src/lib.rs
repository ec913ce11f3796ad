//! ConEmu AutoTheme - keeps the ConEmu color scheme in step with the
//! system light/dark setting.
//!
//! The process waits for appearance changes, re-reads the setting on every
//! wake, and on a real transition applies the bound palette to the terminal
//! and relaunches it.

pub mod app;
pub mod appearance;
pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod materialize;
pub mod palette;
pub mod sync_loop;
pub mod theme;
pub mod watcher;
