mod logic;

use std::mem;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::asm::{self, Assembly};
use crate::code::{CodeSegment, Op};
use crate::console::Console;
use crate::constants;
use crate::disk::{Disk, DiskProvider, MemoryDisks};
use crate::error::{Fault, RuntimeError};
use crate::labels::LabelTable;
use crate::stack::{CallStack, DataStack};
use crate::value::Value;

/// The interpreter.
///
/// Owns the assembled code, both stacks, the optional mounted disk, and
/// the [`Console`](trait.Console.html) everything is printed through. One
/// machine runs one program at a time; `EXECUTE` re-enters the same
/// machine with a fresh code segment and call stack while sharing the
/// data stack and disk.
pub struct Machine {
    code: CodeSegment,
    labels: LabelTable,
    ip: usize,
    halted: bool,
    exit_code: i32,
    exec_depth: usize,
    data: DataStack,
    calls: CallStack,
    disk: Option<Disk>,
    rng: StdRng,
    console: Box<dyn Console>,
    disks: Box<dyn DiskProvider>,
}

impl Machine {
    pub fn new(console: Box<dyn Console>) -> Machine {
        Machine::with_disks(console, Box::new(MemoryDisks))
    }

    pub fn with_disks(console: Box<dyn Console>, disks: Box<dyn DiskProvider>) -> Machine {
        Machine {
            code: CodeSegment::new(),
            labels: LabelTable::new(),
            ip: 0,
            halted: false,
            exit_code: 0,
            exec_depth: 0,
            data: DataStack::new(),
            calls: CallStack::new(),
            disk: None,
            rng: StdRng::from_entropy(),
            console,
            disks,
        }
    }

    pub fn data(&self) -> &DataStack {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataStack {
        &mut self.data
    }

    pub fn disk(&self) -> Option<&Disk> {
        self.disk.as_ref()
    }

    /// Runs `assembly` from its entry point until the program halts, and
    /// returns the exit code. Fragments without `BEGIN` start at index 0.
    pub fn run(&mut self, assembly: Assembly) -> Result<i32, RuntimeError> {
        self.ip = assembly.entry_or_default();
        self.code = assembly.code;
        self.labels = assembly.labels;
        self.halted = false;
        self.exit_code = 0;
        let result = self.run_loop();
        self.console.flush();
        if let Ok(code) = result {
            debug!("program halted with exit code {}", code);
        }
        result
    }

    fn run_loop(&mut self) -> Result<i32, RuntimeError> {
        while !self.halted {
            let op = match self.code.get(self.ip) {
                Some(op) => op.clone(),
                None => return Err(RuntimeError::bare(Fault::BadIp(self.ip))),
            };
            // pre-increment: every op observes the address of its successor
            self.ip += 1;

            if self.console.debug_enabled() {
                self.console.debug(&self.data.render(), op.name());
            }

            self.step(&op)
                .map_err(|fault| RuntimeError::in_op(op.name(), fault))?;
        }
        Ok(self.exit_code)
    }

    fn step(&mut self, op: &Op) -> Result<(), Fault> {
        match op {
            Op::Push(value) => self.data.push(value.clone()),
            Op::Instr(instr) => logic::step(self, *instr),
            Op::Symbol(_) => Err(Fault::CorruptCode(self.ip - 1)),
        }
    }

    /// EXECUTE: pops source text, assembles and runs it with a fresh code
    /// segment and call stack, then restores the saved interpreter state
    /// and pushes the nested exit code. Failures of the nested program are
    /// reported to the error stream, not propagated.
    fn execute_nested(&mut self) -> Result<(), Fault> {
        let source = self.data.pop_string()?;
        if self.exec_depth >= constants::EXECUTE_DEPTH_LIMIT {
            return Err(Fault::ExecuteDepth);
        }

        let saved_code = mem::take(&mut self.code);
        let saved_labels = mem::take(&mut self.labels);
        let saved_calls = mem::take(&mut self.calls);
        let saved_ip = self.ip;
        self.exec_depth += 1;

        let code = match asm::assemble(&source) {
            Ok(assembly) => {
                self.ip = assembly.entry_or_default();
                self.code = assembly.code;
                self.labels = assembly.labels;
                self.calls = CallStack::new();
                self.halted = false;
                self.exit_code = 0;
                match self.run_loop() {
                    Ok(code) => code,
                    Err(err) => {
                        self.console.error(&format!("{}\n", err));
                        0
                    }
                }
            }
            Err(err) => {
                self.console.error(&format!("Fatal assembly error: {}\n", err));
                0
            }
        };

        self.code = saved_code;
        self.labels = saved_labels;
        self.calls = saved_calls;
        self.ip = saved_ip;
        self.halted = false;
        self.exit_code = 0;
        self.exec_depth -= 1;

        self.data.push(Value::Int(code))
    }
}
