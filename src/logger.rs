//! Minimal stderr logger for the `log` facade.
//!
//! Level comes from the `-v` count on the command line or from `BF_TAPE_LOG`
//! (`off`, `error`, `warn`, `info`, `debug`, `trace`). Level tags are coloured
//! only when stderr is a terminal.

use std::io::{self, IsTerminal, Write};

use log::{Level, LevelFilter, Log, Metadata, Record};
use nu_ansi_term::{Color, Style};

pub const ENV_LOG: &str = "BF_TAPE_LOG";

struct StderrLogger {
    color: bool,
}

impl StderrLogger {
    fn style_for(level: Level) -> Style {
        match level {
            Level::Error => Color::Red.bold(),
            Level::Warn => Color::Yellow.bold(),
            Level::Info => Style::new(),
            Level::Debug => Color::Cyan.normal(),
            Level::Trace => Color::DarkGray.normal(),
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
        let tag = format!("[{:<5}]", record.level());
        let tag = if self.color {
            Self::style_for(record.level()).paint(tag).to_string()
        } else {
            tag
        };
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{tag} {}", record.args());
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Map a `-v` count to a level filter. Warnings are on by default.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Parse a `BF_TAPE_LOG` value.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse::<LevelFilter>().ok()
}

/// Install the logger. Later calls are ignored.
pub fn init(verbose: u8) {
    let level = if verbose > 0 {
        level_from_verbosity(verbose)
    } else {
        std::env::var(ENV_LOG)
            .ok()
            .and_then(|v| parse_level(&v))
            .unwrap_or(LevelFilter::Warn)
    };

    let logger = StderrLogger { color: io::stderr().is_terminal() };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_steps_through_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(1), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(7), LevelFilter::Trace);
    }

    #[test]
    fn env_values_parse_case_insensitively() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" off "), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }
}
