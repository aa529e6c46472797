//! Minimal stderr backend for the `log` facade.
//!
//! The library only emits records; the binary calls `init` once with the
//! level chosen on the command line. Output goes to stderr so that board
//! prints and JSON on stdout stay clean.

use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl StderrLogger {
    fn level_prefix(level: Level) -> &'static str {
        match level {
            Level::Error => "[ERROR] ",
            Level::Warn => "[WARN ] ",
            Level::Info => "[INFO ] ",
            Level::Debug => "[DEBUG] ",
            Level::Trace => "[TRACE] ",
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        let module = record.module_path().unwrap_or("?");
        // A closed stderr is not worth failing over.
        let _ = writeln!(
            err,
            "{}[{}] {}",
            Self::level_prefix(record.level()),
            module,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the stderr logger at `level`.
///
/// Fails if another logger was installed first.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Map `-v` / `-q` counts to a level. Warnings are shown by default.
pub fn level_from_verbosity(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
