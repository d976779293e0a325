// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[macro_export]
macro_rules! info {
    ($msg:literal, $($arg:tt)+) => {
        vivace_log::_log::info!(target: concat!("vivace::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        vivace_log::_log::info!(target: concat!("vivace::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:literal, $($arg:tt)+) => {
        vivace_log::_log::warn!(target: concat!("vivace::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        vivace_log::_log::warn!(target: concat!("vivace::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! debug {
    ($msg:literal, $($arg:tt)+) => {
        vivace_log::_log::debug!(target: concat!("vivace::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        vivace_log::_log::debug!(target: concat!("vivace::", module_path!()), $msg);
    };
}

/// Log a diagnostic message at info level if diagnostics logging is enabled.
#[macro_export]
macro_rules! diagnostic {
    ($msg:literal, $($arg:tt)+) => {
        if vivace_log::is_diagnostics_enabled() {
             vivace_log::_log::info!(target: concat!("vivace::", module_path!()), $msg, $($arg)+);
        }
    };
    ($msg:literal) => {
        if vivace_log::is_diagnostics_enabled() {
            vivace_log::_log::info!(target: concat!("vivace::", module_path!()), $msg);
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Map the number of `-v` flags given on a command line to a level filter.
pub fn level_from_verbosity(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Initialize the logging.
///
/// Installs `env_logger` as the process logger with `level` as the default
/// filter. `RUST_LOG` takes precedence when set. Calling this more than once
/// keeps the first logger but still updates the diagnostics flag.
pub fn init_logging(level: log::LevelFilter, with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
    let env = env_logger::Env::default().default_filter_or(level.to_string());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from_verbosity(0), log::LevelFilter::Info);
        assert_eq!(level_from_verbosity(1), log::LevelFilter::Debug);
        assert_eq!(level_from_verbosity(7), log::LevelFilter::Trace);
    }

    #[test]
    fn test_init_twice() {
        init_logging(log::LevelFilter::Warn, true);
        assert!(is_diagnostics_enabled());
        init_logging(log::LevelFilter::Warn, false);
        assert!(!is_diagnostics_enabled());
    }
}
