//! Two-pass assembler for the stack-machine source language.
//!
//! Source programs are whitespace-separated tokens. The first pass walks
//! them in order and classifies each token, first match wins:
//!
//! 1. a token starting with `;` discards the rest of the line;
//! 2. a token starting with `""` pushes the rest of the line as a
//!    character range (spaces and tabs become `SPACE`/`TAB` references),
//!    followed by its length;
//! 3. `true` / `false` (case-insensitive) push a boolean;
//! 4. a signed decimal integer pushes an `Int`;
//! 5. 1 to 8 hex digits, optionally `0x`-prefixed, push an `Int` parsed
//!    base 16;
//! 6. a token containing `.` or an exponent that parses as a float pushes
//!    a `Float`;
//! 7. `'x'` pushes a character;
//! 8. `@Name` declares a label at the current code-segment size;
//! 9. `BEGIN` records the entry index, once;
//! 10. an instruction mnemonic appends that instruction;
//! 11. a name already in the label table pushes the resolved label;
//! 12. anything else becomes a placeholder for the second pass.
//!
//! The second pass rewrites every placeholder in place from the completed
//! label table; a name that is still unknown is fatal.
//!
//! Tokenisation is implemented with [pest], and the [`Error`](type.Error.html)
//! type of this module is a type alias of `pest::error::Error`, so every
//! diagnostic carries source position and pretty-prints through pest.
//!
//! [pest]: https://docs.rs/pest/

use lazy_static::lazy_static;
use log::debug;
use pest::iterators::Pair;
use pest::{Parser, Position, Span};
use pest_derive::Parser;
use regex::Regex;

use crate::code::{CodeSegment, Op};
use crate::instr::{self, Instr};
use crate::labels::LabelTable;
use crate::value::{Label, Value};

#[derive(Parser)]
#[grammar = "asm/grammar.pest"]
struct SourceParser;

pub type Error = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a successful assembly produces.
#[derive(Debug)]
pub struct Assembly {
    pub code: CodeSegment,
    pub labels: LabelTable,
    /// `Some` iff the source contained `BEGIN`; always within bounds.
    pub entry: Option<usize>,
}

impl Assembly {
    /// Entry index for execution; fragments without `BEGIN` start at 0.
    pub fn entry_or_default(&self) -> usize {
        self.entry.unwrap_or(0)
    }
}

lazy_static! {
    static ref INT_RE: Regex = Regex::new(r"^[+-]?[0-9]+$").unwrap();
    static ref HEX_RE: Regex = Regex::new(r"^(0x)?[0-9A-Fa-f]{1,8}$").unwrap();
    static ref LABEL_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

fn new_parser_error(span: Span, message: String) -> Error {
    Error::new_from_span(pest::error::ErrorVariant::CustomError { message }, span)
}

fn new_program_error(input: &str, message: String) -> Error {
    Error::new_from_pos(
        pest::error::ErrorVariant::CustomError { message },
        Position::from_start(input),
    )
}

/// Assembles `input` into code, labels and an optional entry index.
///
/// A declared `BEGIN` must point inside the code segment; whether a
/// missing one is acceptable depends on the caller, see
/// [`assemble_program`](fn.assemble_program.html).
pub fn assemble(input: &str) -> Result<Assembly> {
    let program = SourceParser::parse(Rule::program, input)?.next().unwrap();

    let mut code = CodeSegment::new();
    let mut labels = LabelTable::new();
    let mut entry = None;

    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::string => emit_string(&mut code, &pair)?,
            Rule::token => process_token(&mut code, &mut labels, &mut entry, &pair)?,
            Rule::EOI => {}
            _ => unreachable!(),
        }
    }

    if let Some(index) = entry {
        if index >= code.size() {
            return Err(new_program_error(
                input,
                "BEGIN is undefined or out of bounds".to_owned(),
            ));
        }
    }

    resolve(input, &mut code, &labels)?;

    debug!(
        "assembled {} ops, {} labels, entry {:?}",
        code.size(),
        labels.len(),
        entry
    );

    Ok(Assembly {
        code,
        labels,
        entry,
    })
}

/// Assembles a complete program; unlike [`assemble`](fn.assemble.html) a
/// missing `BEGIN` is an error.
pub fn assemble_program(input: &str) -> Result<Assembly> {
    let assembly = assemble(input)?;
    if assembly.entry.is_none() {
        return Err(new_program_error(
            input,
            "BEGIN is undefined or out of bounds".to_owned(),
        ));
    }
    Ok(assembly)
}

fn emit_string(code: &mut CodeSegment, pair: &Pair<Rule>) -> Result<()> {
    let text = &pair.as_str()[2..];
    for c in text.chars() {
        match c {
            ' ' => code.append(Op::Instr(Instr::SPACE)),
            '\t' => code.append(Op::Instr(Instr::TAB)),
            c if c.is_ascii() => code.append(Op::Push(Value::Char(c))),
            c => {
                return Err(new_parser_error(
                    pair.as_span(),
                    format!("non-ASCII character {:?} in string literal", c),
                ))
            }
        }
    }
    code.append(Op::Push(Value::Int(text.len() as i32)));
    Ok(())
}

fn process_token(
    code: &mut CodeSegment,
    labels: &mut LabelTable,
    entry: &mut Option<usize>,
    pair: &Pair<Rule>,
) -> Result<()> {
    let text = pair.as_str();

    if text.eq_ignore_ascii_case("true") {
        code.append(Op::Push(Value::Bool(true)));
    } else if text.eq_ignore_ascii_case("false") {
        code.append(Op::Push(Value::Bool(false)));
    } else if let Some(value) = parse_int(text) {
        code.append(Op::Push(Value::Int(value)));
    } else if let Some(value) = parse_hex(text) {
        code.append(Op::Push(Value::Int(value)));
    } else if let Some(value) = parse_float(text) {
        code.append(Op::Push(Value::Float(value)));
    } else if let Some(c) = parse_char(text) {
        if !c.is_ascii() {
            return Err(new_parser_error(
                pair.as_span(),
                format!("character literal {:?} is not ASCII", c),
            ));
        }
        code.append(Op::Push(Value::Char(c)));
    } else if text.starts_with('@') && LABEL_RE.is_match(&text[1..]) {
        declare_label(code, labels, &text[1..], pair)?;
    } else if text.eq_ignore_ascii_case("BEGIN") {
        if entry.is_some() {
            return Err(new_parser_error(
                pair.as_span(),
                "BEGIN is already defined".to_owned(),
            ));
        }
        *entry = Some(code.size());
    } else if let Some(instr) = instr::lookup(text) {
        code.append(Op::Instr(instr));
    } else if let Some(label) = labels.get(text) {
        code.append(Op::Push(Value::Label(label.clone())));
    } else {
        code.append(Op::Symbol(text.to_owned()));
    }

    Ok(())
}

fn declare_label(
    code: &CodeSegment,
    labels: &mut LabelTable,
    name: &str,
    pair: &Pair<Rule>,
) -> Result<()> {
    if instr::is_reserved(name) || instr::lookup(name).is_some() {
        return Err(new_parser_error(
            pair.as_span(),
            format!("\"{}\" is a reserved name", name),
        ));
    }
    labels.add(Label::new(name, code.size())).map_err(|_| {
        new_parser_error(
            pair.as_span(),
            format!("label \"{}\" is already defined", name),
        )
    })
}

/// Pass 2: rewrite every placeholder from the completed label table.
fn resolve(input: &str, code: &mut CodeSegment, labels: &LabelTable) -> Result<()> {
    for index in 0..code.size() {
        let name = match code.get(index) {
            Some(Op::Symbol(name)) => name.clone(),
            _ => continue,
        };
        match labels.get(&name) {
            Some(label) => {
                // in-place rewrite keeps every other index stable
                let _ = code.replace(index, Op::Push(Value::Label(label.clone())));
            }
            None => return Err(unknown_symbol(input, &name)),
        }
    }
    Ok(())
}

fn unknown_symbol(input: &str, name: &str) -> Error {
    let message = format!("Unknown symbol: {}", name);
    match input
        .find(name)
        .and_then(|start| Span::new(input, start, start + name.len()))
    {
        Some(span) => new_parser_error(span, message),
        None => new_program_error(input, message),
    }
}

fn parse_int(text: &str) -> Option<i32> {
    if INT_RE.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

fn parse_hex(text: &str) -> Option<i32> {
    if !HEX_RE.is_match(text) {
        return None;
    }
    let digits = text.strip_prefix("0x").unwrap_or(text);
    u32::from_str_radix(digits, 16).ok().map(|v| v as i32)
}

fn parse_float(text: &str) -> Option<f64> {
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text.parse().ok()
    } else {
        None
    }
}

fn parse_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next(), chars.next(), chars.next()) {
        (Some('\''), Some(c), Some('\''), None) => Some(c),
        _ => None,
    }
}
