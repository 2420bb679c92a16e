//! Terminal front end for the [svm](../svm/index.html) virtual machine.
//!
//! Provides the pieces the core treats as external capabilities: a
//! [`Console`](../svm/trait.Console.html) over real streams with verbosity
//! filtering and optional ANSI color, a
//! [`DiskProvider`](../svm/trait.DiskProvider.html) that backs mounted
//! disks with fixed-length files, and the [`run_file`](fn.run_file.html)
//! helper the binary is a thin wrapper around.

use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use nu_ansi_term::Color;

use svm::{Console, DiskProvider, LogLevel, Machine, Memory, Storage};

#[derive(Debug)]
pub enum IOErrorContext {
    ReadSource,
    OpenStream,
}

#[derive(Debug)]
pub enum Error {
    Asm(svm::asm::Error),
    Runtime(svm::RuntimeError),
    Io(io::Error, IOErrorContext, PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err, context, path) => writeln!(
                f,
                "{} \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadSource => "Reading source file",
                    IOErrorContext::OpenStream => "Opening stream file",
                },
                path.display(),
                err
            ),
            Error::Asm(err) => {
                writeln!(f, "Fatal assembly error:")?;
                write!(f, "{}", err)
            }
            Error::Runtime(err) => write!(f, "{}", err),
        }
    }
}

/// Console over real streams.
///
/// Input defaults to stdin, output to stdout, errors and logs to stderr;
/// any of the four can be redirected to a file. Log messages below the
/// configured verbosity are dropped here, outside the machine.
pub struct TermConsole {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    errors: Box<dyn Write>,
    logs: Box<dyn Write>,
    verbosity: LogLevel,
    debug: bool,
    color: bool,
}

impl TermConsole {
    pub fn new(verbosity: LogLevel, color: bool) -> TermConsole {
        TermConsole {
            input: Box::new(BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
            errors: Box::new(io::stderr()),
            logs: Box::new(io::stderr()),
            verbosity,
            debug: false,
            color,
        }
    }

    pub fn redirect_input(&mut self, input: Box<dyn BufRead>) {
        self.input = input;
    }

    pub fn redirect_output(&mut self, output: Box<dyn Write>) {
        self.output = output;
    }

    pub fn redirect_errors(&mut self, errors: Box<dyn Write>) {
        self.errors = errors;
    }

    pub fn redirect_logs(&mut self, logs: Box<dyn Write>) {
        self.logs = logs;
    }
}

impl Console for TermConsole {
    fn get_line(&mut self) -> io::Result<String> {
        // the prompt is usually still sitting in the output buffer
        self.output.flush()?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input",
            ));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    fn print(&mut self, text: &str) {
        let _ = self.output.write_all(text.as_bytes());
    }

    fn error(&mut self, text: &str) {
        let styled;
        let text = if self.color {
            styled = Color::Red.paint(text).to_string();
            &styled[..]
        } else {
            text
        };
        let _ = self.errors.write_all(text.as_bytes());
        let _ = self.errors.flush();
    }

    fn log(&mut self, level: LogLevel, text: &str) {
        if level > self.verbosity {
            return;
        }
        let line = format!("[{}] {}\n", level, text);
        let line = if self.color {
            Color::Cyan.paint(line).to_string()
        } else {
            line
        };
        let _ = self.logs.write_all(line.as_bytes());
    }

    fn debug(&mut self, stack: &str, op: &str) {
        let line = format!("[{}] {}\n", stack, op);
        let line = if self.color {
            Color::DarkGray.paint(line).to_string()
        } else {
            line
        };
        let _ = self.errors.write_all(line.as_bytes());
    }

    fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    fn debug_enabled(&self) -> bool {
        self.debug
    }

    fn flush(&mut self) {
        let _ = self.output.flush();
        let _ = self.errors.flush();
        let _ = self.logs.flush();
    }
}

/// Backs mounted disks with fixed-length files in the working directory.
///
/// The file is read fully at mount time (missing files start zeroed) and
/// written back when the machine drops the tape, so a disk survives from
/// one run to the next.
pub struct FileDisks {
    dir: PathBuf,
}

impl FileDisks {
    pub fn new() -> FileDisks {
        FileDisks {
            dir: PathBuf::from("."),
        }
    }

    pub fn in_dir<P: AsRef<Path>>(dir: P) -> FileDisks {
        FileDisks {
            dir: dir.as_ref().to_owned(),
        }
    }
}

impl Default for FileDisks {
    fn default() -> FileDisks {
        FileDisks::new()
    }
}

impl DiskProvider for FileDisks {
    fn open(&mut self, name: &str, length: u32) -> io::Result<Box<dyn Storage>> {
        let path = self.dir.join(name);
        let mut data = vec![0u8; length as usize];
        match File::open(&path) {
            Ok(mut file) => {
                let mut existing = Vec::new();
                file.read_to_end(&mut existing)?;
                let keep = existing.len().min(data.len());
                data[..keep].copy_from_slice(&existing[..keep]);
            }
            Err(ref err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        Ok(Box::new(FileTape {
            path,
            memory: Memory::from(&data[..]),
        }))
    }
}

struct FileTape {
    path: PathBuf,
    memory: Memory,
}

impl Storage for FileTape {
    fn length(&self) -> u32 {
        self.memory.length()
    }

    fn check_range(&self, address: u32, length: u32) -> bool {
        self.memory.check_range(address, length)
    }

    fn borrow_slice(&self, address: u32, length: u32) -> Result<&[u8], ()> {
        self.memory.borrow_slice(address, length)
    }

    fn borrow_slice_mut(&mut self, address: u32, length: u32) -> Result<&mut [u8], ()> {
        self.memory.borrow_slice_mut(address, length)
    }
}

impl Drop for FileTape {
    fn drop(&mut self) {
        if let Ok(file) = File::create(&self.path) {
            let mut writer = BufWriter::new(file);
            let _ = writer.write_all(self.memory.data());
        }
    }
}

/// Stream redirections and flags for one run.
pub struct RunOptions {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub errors: Option<PathBuf>,
    pub logs: Option<PathBuf>,
    pub verbosity: LogLevel,
    pub debug: bool,
    pub color: bool,
}

impl Default for RunOptions {
    fn default() -> RunOptions {
        RunOptions {
            input: None,
            output: None,
            errors: None,
            logs: None,
            verbosity: LogLevel::Warning,
            debug: false,
            color: false,
        }
    }
}

fn open_writer(path: &Path) -> Result<Box<dyn Write>, Error> {
    let file = File::create(path)
        .map_err(|err| Error::Io(err, IOErrorContext::OpenStream, path.to_owned()))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Reads, assembles and runs a source file; returns the program's exit
/// code.
pub fn run_file(source: &Path, options: RunOptions) -> Result<i32, Error> {
    let file = File::open(source)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadSource, source.to_owned()))?;
    let mut reader = BufReader::new(file);
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadSource, source.to_owned()))?;

    let assembly = svm::asm::assemble_program(&text).map_err(Error::Asm)?;

    let mut console = TermConsole::new(options.verbosity, options.color);
    if let Some(path) = &options.input {
        let file = File::open(path)
            .map_err(|err| Error::Io(err, IOErrorContext::OpenStream, path.to_owned()))?;
        console.redirect_input(Box::new(BufReader::new(file)));
    }
    if let Some(path) = &options.output {
        console.redirect_output(open_writer(path)?);
    }
    if let Some(path) = &options.errors {
        console.redirect_errors(open_writer(path)?);
    }
    if let Some(path) = &options.logs {
        console.redirect_logs(open_writer(path)?);
    }
    console.set_debug(options.debug);

    let mut machine = Machine::with_disks(Box::new(console), Box::new(FileDisks::new()));
    machine.run(assembly).map_err(Error::Runtime)
}
