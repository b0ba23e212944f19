//! Process-wide logger behind the `log` facade.
//!
//! Lines go to stderr, or are appended to a log file when one is configured.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Verbosity levels, ordered from quiet to chatty
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(i32)]
pub enum LogLevel {
    Nothing = 0,
    Error = 1,
    Warning = 2,
    #[default]
    Info = 3,
    Debug = 4,
    All = 5,
}

impl LogLevel {
    /// Create a LogLevel from an integer; unknown values map to `Info`
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::Error,
            2 => LogLevel::Warning,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Parse a level name (`error`, `warn`, `info`, ...) or number
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nothing" | "off" | "none" => Some(LogLevel::Nothing),
            "error" => Some(LogLevel::Error),
            "warning" | "warn" => Some(LogLevel::Warning),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "all" | "trace" => Some(LogLevel::All),
            other => other.parse::<i32>().ok().filter(|n| (0..=5).contains(n)).map(Self::from_i32),
        }
    }

    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }
}

struct LineLogger {
    file: Mutex<Option<File>>,
}

static LOGGER: LineLogger = LineLogger {
    file: parking_lot::const_mutex(None),
};

impl Log for LineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!("[{:<5}] {}: {}", record.level(), record.target(), record.args());
        let mut guard = self.file.lock();
        match guard.as_mut() {
            Some(file) => {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
            None => eprintln!("{}", line),
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Install the logger.
///
/// Calling this again replaces the level and the log file.
///
/// # Errors
/// Returns the I/O error if `log_file` cannot be opened for appending.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> io::Result<()> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };
    *LOGGER.file.lock() = file;

    // Already installed by an earlier call
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level.to_filter());
    Ok(())
}
