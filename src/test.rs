use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::asm::{self, Assembly};
use crate::console::{Console, LogLevel};
use crate::error::RuntimeError;
use crate::machine::Machine;
use crate::value::Value;

mod assembler;
mod machine;
mod scenarios;

/// Everything a program emitted through its console.
#[derive(Default)]
pub struct Captured {
    pub output: String,
    pub errors: String,
    pub logs: Vec<(LogLevel, String)>,
    pub traces: Vec<String>,
}

/// Console that queues input lines and records all four streams, shared
/// with the test through an `Rc`.
pub struct TestConsole {
    input: Vec<String>,
    captured: Rc<RefCell<Captured>>,
    debug: bool,
}

impl TestConsole {
    pub fn new() -> (TestConsole, Rc<RefCell<Captured>>) {
        TestConsole::with_input(&[])
    }

    pub fn with_input(lines: &[&str]) -> (TestConsole, Rc<RefCell<Captured>>) {
        let captured = Rc::new(RefCell::new(Captured::default()));
        let console = TestConsole {
            input: lines.iter().rev().map(|line| (*line).to_owned()).collect(),
            captured: Rc::clone(&captured),
            debug: false,
        };
        (console, captured)
    }
}

impl Console for TestConsole {
    fn get_line(&mut self) -> io::Result<String> {
        self.input
            .pop()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
    }

    fn print(&mut self, text: &str) {
        self.captured.borrow_mut().output.push_str(text);
    }

    fn error(&mut self, text: &str) {
        self.captured.borrow_mut().errors.push_str(text);
    }

    fn log(&mut self, level: LogLevel, text: &str) {
        self.captured
            .borrow_mut()
            .logs
            .push((level, text.to_owned()));
    }

    fn debug(&mut self, stack: &str, op: &str) {
        self.captured
            .borrow_mut()
            .traces
            .push(format!("[{}] {}", stack, op));
    }

    fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    fn debug_enabled(&self) -> bool {
        self.debug
    }

    fn sleep(&mut self, _millis: u64) -> bool {
        true
    }
}

pub fn assemble(source: &str) -> Assembly {
    match asm::assemble_program(source) {
        Ok(assembly) => assembly,
        Err(err) => panic!("assembly failed:\n{}", err),
    }
}

pub fn run_program(source: &str) -> (Machine, i32) {
    let (console, _) = TestConsole::new();
    run_with(source, console)
}

pub fn run_with(source: &str, console: TestConsole) -> (Machine, i32) {
    let mut machine = Machine::new(Box::new(console));
    let code = match machine.run(assemble(source)) {
        Ok(code) => code,
        Err(err) => panic!("program failed: {}", err),
    };
    (machine, code)
}

pub fn run_err(source: &str) -> RuntimeError {
    let (console, _) = TestConsole::new();
    run_err_with(source, console)
}

pub fn run_err_with(source: &str, console: TestConsole) -> RuntimeError {
    let mut machine = Machine::new(Box::new(console));
    match machine.run(assemble(source)) {
        Ok(code) => panic!("program halted with {} instead of failing", code),
        Err(err) => err,
    }
}

/// Runs a fragment that leaves values on the stack and returns the final
/// stack, bottom to top.
pub fn eval(fragment: &str) -> Vec<Value> {
    let source = format!("BEGIN {}\n0 EXIT", fragment);
    let (machine, code) = run_program(&source);
    assert_eq!(code, 0);
    machine.data().values().to_vec()
}
