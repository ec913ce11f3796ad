use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use conemu_autotheme::app;
use conemu_autotheme::appearance;
use conemu_autotheme::config::{self, ResolvedConfig, Strategy};
use conemu_autotheme::error::{AutoThemeError, ErrorSeverity, ResultExt};
use conemu_autotheme::logging::{self, LoggingOptions};
use conemu_autotheme::palette::palette_names;
use conemu_autotheme::watcher;

/// Follow the system light/dark setting with ConEmu color schemes
#[derive(Debug, Parser)]
#[command(name = "conemu-autotheme", version, about)]
struct Cli {
    /// <TERMINAL> <LIGHT_THEME> <DARK_THEME>; used only when all three are given
    #[arg(value_name = "ARGS")]
    positional: Vec<String>,

    /// Config file (default: ~/.conemu-autotheme/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How a switch reaches the terminal
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Apply the scheme for the current mode, launch once, and exit
    #[arg(long)]
    once: bool,

    /// Print the known scheme names and exit
    #[arg(long)]
    list_themes: bool,

    /// Debug-level logging (RUST_LOG still wins)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_themes {
        for name in palette_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    let _guard = logging::init(LoggingOptions {
        verbose: cli.verbose,
    });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let category = match e.severity() {
                ErrorSeverity::Fatal => "FATAL",
                ErrorSeverity::Error => "RUNTIME",
                ErrorSeverity::Warning => "WARNING",
            };
            logging::log_error(category, &e.to_string(), Some(&e.user_message()));
            eprintln!("error: {}", e.user_message());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), AutoThemeError> {
    let file_config = config::load_config(cli.config.as_deref())?;
    let mut resolved = ResolvedConfig::resolve(&file_config, &cli.positional);
    if let Some(strategy) = cli.strategy {
        resolved.strategy = strategy;
    }
    info!(
        terminal = %resolved.terminal_path.display(),
        light = %resolved.light_theme,
        dark = %resolved.dark_theme,
        strategy = resolved.strategy.as_str(),
        "Configuration resolved"
    );

    let source = appearance::system_source();
    app::run(&resolved, cli.once, &source, |poll_interval| {
        let notifier = watcher::system_notifier(poll_interval)?;
        let shutdown = notifier.shutdown_handle();
        ctrlc::set_handler(move || shutdown.request())
            .context("installing Ctrl+C handler")
            .warn_on_err();
        Ok(notifier)
    })?;
    Ok(())
}
