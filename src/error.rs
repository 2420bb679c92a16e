use std::error::Error as StdError;
use std::fmt;

/// A runtime failure, before it has been attributed to the instruction
/// that raised it.
#[derive(Clone, Debug, PartialEq)]
pub enum Fault {
    StackUnderflow,
    StackOverflow,
    CallStackUnderflow,
    CallStackOverflow,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    DivisionByZero,
    /// A strictly positive count was required.
    NotPositive(i32),
    ZeroRotation,
    /// A range count that is negative, or zero where the operation forbids it.
    BadRange(i32),
    BadSplit {
        count: i32,
        at: i32,
    },
    BadLogLevel(i32),
    /// Instruction pointer outside the code segment; only reachable
    /// through a label smuggled in from another program.
    BadIp(usize),
    /// A pass-1 placeholder survived into execution.
    CorruptCode(usize),
    ExecuteDepth,
    NoDisk,
    DiskBounds {
        position: i64,
        length: u32,
        size: u32,
    },
    BadGeometry {
        sector_size: i32,
        sector_count: i32,
    },
    BadNumber {
        kind: &'static str,
        text: String,
    },
    NonAscii(char),
    BadCharCode(i32),
    Io(String),
    Aborted(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Fault::StackUnderflow => f.write_str("stack underflow"),
            Fault::StackOverflow => f.write_str("stack overflow"),
            Fault::CallStackUnderflow => {
                f.write_str("cannot RETURN without first making a CALL")
            }
            Fault::CallStackOverflow => f.write_str("call stack overflow"),
            Fault::WrongType { expected, found } => {
                write!(f, "expected a {}, found a {}", expected, found)
            }
            Fault::DivisionByZero => f.write_str("division by zero"),
            Fault::NotPositive(n) => write!(f, "expected a positive count, got {}", n),
            Fault::ZeroRotation => f.write_str("cannot rotate zero values"),
            Fault::BadRange(n) => write!(f, "bad range count {}", n),
            Fault::BadSplit { count, at } => {
                write!(f, "cannot split a range of {} at {}", count, at)
            }
            Fault::BadLogLevel(level) => {
                write!(f, "log level must be between 0 and 3, got {}", level)
            }
            Fault::BadIp(index) => {
                write!(f, "instruction pointer {} is out of bounds", index)
            }
            Fault::CorruptCode(index) => {
                write!(f, "unresolved symbol in code segment at {}", index)
            }
            Fault::ExecuteDepth => f.write_str("EXECUTE nested deeper than 16"),
            Fault::NoDisk => f.write_str("no disk is mounted"),
            Fault::DiskBounds {
                position,
                length,
                size,
            } => write!(
                f,
                "disk access at {} (+{}) is outside the {}-byte tape",
                position, length, size
            ),
            Fault::BadGeometry {
                sector_size,
                sector_count,
            } => write!(
                f,
                "invalid disk geometry {} x {}",
                sector_size, sector_count
            ),
            Fault::BadNumber { kind, text } => write!(f, "\"{}\" is not {}", text, kind),
            Fault::NonAscii(c) => write!(f, "character {:?} is not ASCII", c),
            Fault::BadCharCode(code) => write!(f, "{} is not an ASCII code", code),
            Fault::Io(message) => write!(f, "I/O error: {}", message),
            Fault::Aborted(message) => f.write_str(message),
        }
    }
}

impl StdError for Fault {}

/// A [`Fault`](enum.Fault.html) annotated with the display name of the
/// instruction that was executing when it was raised. Fetch failures carry
/// no instruction name.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeError {
    pub op: Option<String>,
    pub fault: Fault,
}

impl RuntimeError {
    pub fn in_op(op: &str, fault: Fault) -> RuntimeError {
        RuntimeError {
            op: Some(op.to_owned()),
            fault,
        }
    }

    pub fn bare(fault: Fault) -> RuntimeError {
        RuntimeError { op: None, fault }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.op {
            Some(op) => write!(f, "Runtime error in {}: {}", op, self.fault),
            None => write!(f, "Runtime error: {}", self.fault),
        }
    }
}

impl StdError for RuntimeError {}
