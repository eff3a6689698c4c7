//! Rolling Logger
//!
//! `log` backend that writes every record to the console (browser devtools
//! under wasm, stderr elsewhere) and keeps the most recent lines in a
//! circular buffer so the app can show them without a log file.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Lines kept in memory
pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug)]
pub enum LoggerError {
    AlreadyInitialized,
    NotInitialized,
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerError::AlreadyInitialized => f.write_str("logger already initialized"),
            LoggerError::NotInitialized => f.write_str("logger not initialized"),
        }
    }
}

impl std::error::Error for LoggerError {}

/// Fixed-size line buffer; the oldest line goes first when full
#[derive(Debug)]
pub struct LineBuffer {
    capacity: usize,
    lines: VecDeque<String>,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

struct RollingLogger {
    app_name: String,
    buffer: Mutex<LineBuffer>,
}

impl RollingLogger {
    fn format(&self, level: Level, target: &str, message: &fmt::Arguments<'_>) -> String {
        format!(
            "[{}] {:<5} {} {}: {}",
            Local::now().format("%H:%M:%S%.3f"),
            level,
            self.app_name,
            target,
            message
        )
    }

    fn remember(&self, line: &str) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(line.to_string());
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    match level {
        Level::Error => web_sys::console::error_1(&line.into()),
        Level::Warn => web_sys::console::warn_1(&line.into()),
        Level::Info => web_sys::console::info_1(&line.into()),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&line.into()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record.level(), record.target(), record.args());
        emit(record.level(), &line);
        self.remember(&line);
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

/// Install the logger as the global `log` backend
pub fn init_logger(app_name: &str, level: LevelFilter) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    let logger = LOGGER.get_or_init(|| RollingLogger {
        app_name: app_name.to_string(),
        buffer: Mutex::new(LineBuffer::new(DEFAULT_CAPACITY)),
    });
    log::set_logger(logger).map_err(|_| LoggerError::AlreadyInitialized)?;
    log::set_max_level(level);
    Ok(())
}

/// Change the level after startup (config loaded later than the logger)
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

fn write_direct(level: Level, message: &str) -> Result<(), LoggerError> {
    let logger = LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    let line = logger.format(level, "app", &format_args!("{}", message));
    emit(level, &line);
    logger.remember(&line);
    Ok(())
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    write_direct(Level::Info, message)
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    write_direct(Level::Error, message)
}

/// Buffered lines, oldest first; empty before `init_logger`
pub fn recent_lines() -> Vec<String> {
    LOGGER
        .get()
        .and_then(|logger| logger.buffer.lock().ok().map(|b| b.lines()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_drops_oldest() {
        let mut buffer = LineBuffer::new(3);
        for i in 0..5 {
            buffer.push(format!("line {}", i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.lines(), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut buffer = LineBuffer::new(0);
        buffer.push("a".into());
        buffer.push("b".into());
        assert_eq!(buffer.lines(), vec!["b"]);
    }

    #[test]
    fn test_init_then_log() {
        init_logger("FiscalDesk", LevelFilter::Info).unwrap();
        assert!(matches!(init_logger("Again", LevelFilter::Info), Err(LoggerError::AlreadyInitialized)));

        log::info!("visible");
        log::debug!("filtered");
        info("direct").unwrap();

        let lines = recent_lines();
        assert!(lines.iter().any(|l| l.contains("visible") && l.contains("FiscalDesk")));
        assert!(lines.iter().any(|l| l.contains("direct")));
        assert!(!lines.iter().any(|l| l.contains("filtered")));
    }
}
