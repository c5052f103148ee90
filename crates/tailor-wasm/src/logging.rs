//! Browser console logging for the `log` facade.
//!
//! The core crate only emits `log` records; this module installs a logger
//! that forwards them to `console.*` so they show up in dev tools.

use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;
use web_sys::console;

/// Logger configuration.
#[derive(Debug, Clone, Copy)]
pub struct LoggingConfig {
    /// Most verbose level forwarded to the console.
    pub level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
        }
    }
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;
static INIT: Once = Once::new();

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format_record(record));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

/// Installs the console logger once.
///
/// This function is idempotent; subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(config.level);
            log::debug!("logging initialized");
        }
    });
}

/// Parse a level name ("off", "error", "warn", "info", "debug", "trace").
pub(crate) fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}

/// Change how verbose console logging is.
///
/// # Errors
///
/// Returns an error for an unknown level name.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter =
        parse_level(level).ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    init_logging(LoggingConfig { level: filter });
    log::set_max_level(filter);
    Ok(())
}
