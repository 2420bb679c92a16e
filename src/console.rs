use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

/// Program log levels. A message at level `L` is emitted iff `L` does not
/// exceed the configured verbosity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Warning,
    Event,
    Info,
    Verbose,
}

impl LogLevel {
    pub fn from_i32(level: i32) -> Option<LogLevel> {
        match level {
            0 => Some(LogLevel::Warning),
            1 => Some(LogLevel::Event),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Verbose),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Warning => "WARNING",
            LogLevel::Event => "EVENT",
            LogLevel::Info => "INFO",
            LogLevel::Verbose => "VERBOSE",
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseLevelError {
    pub value: String,
}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Failed to parse \"{}\" as a log level.", &self.value)
    }
}

impl StdError for ParseLevelError {}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    /// Accepts both the numeric and the symbolic spelling.
    fn from_str(s: &str) -> Result<LogLevel, ParseLevelError> {
        match s.to_ascii_uppercase().as_str() {
            "0" | "WARNING" => Ok(LogLevel::Warning),
            "1" | "EVENT" => Ok(LogLevel::Event),
            "2" | "INFO" => Ok(LogLevel::Info),
            "3" | "VERBOSE" => Ok(LogLevel::Verbose),
            _ => Err(ParseLevelError {
                value: s.to_owned(),
            }),
        }
    }
}

/// The I/O capabilities the machine consumes.
///
/// The machine treats the four streams as opaque sinks: verbosity
/// filtering, coloring and redirection are the implementor's business.
pub trait Console {
    /// Blocks for one line of input, terminator stripped.
    fn get_line(&mut self) -> io::Result<String>;

    /// Writes to the main output stream.
    fn print(&mut self, text: &str);

    /// Writes to the error stream.
    fn error(&mut self, text: &str);

    /// Writes to the log stream.
    fn log(&mut self, level: LogLevel, text: &str);

    /// Per-tick trace line; only invoked while the debug flag is on.
    fn debug(&mut self, stack: &str, op: &str);

    fn set_debug(&mut self, enabled: bool);

    fn debug_enabled(&self) -> bool;

    /// Blocks for `millis` milliseconds; returns false if the wait was
    /// interrupted.
    fn sleep(&mut self, millis: u64) -> bool {
        thread::sleep(Duration::from_millis(millis));
        true
    }

    /// Flushed once when a run finishes.
    fn flush(&mut self) {}
}
