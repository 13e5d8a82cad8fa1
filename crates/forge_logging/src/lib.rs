#![deny(missing_docs)]
//! Shared logging utilities for the selector forge workspace.
//!
//! This crate provides the `forge_*` logging macros used across the codebase,
//! the logger setup used by the terminal front end, and a minimal test
//! initializer for the global logger.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Default log file, relative to the current working directory.
pub const LOG_FILENAME: &str = "selector_forge.log";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! forge_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! forge_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! forge_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! forge_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! forge_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to `./selector_forge.log` in the current directory.
    #[default]
    File,
    /// Write to the terminal. Uses stderr so the rendered session stays readable.
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the global logger with the specified destination and level.
///
/// For `LogDestination::File` or `Both`, creates the log file in the current
/// working directory. A failure to create the file degrades to no file logger.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    initialize_at(destination, level, Path::new(LOG_FILENAME));
}

/// Same as [`initialize`] with an explicit log file path.
pub fn initialize_at(destination: LogDestination, level: LevelFilter, log_path: &Path) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level, config, log_path) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![terminal_logger(level, config)],
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> =
                vec![terminal_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(level, config, log_path) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Maps a `-v` count onto a level filter, starting from `Info`.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<TermLogger> {
    TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    let log_path = PathBuf::from(log_path);
    match File::create(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
