use super::*;
use crate::code::Op;
use crate::instr::Instr;
use crate::value::Label;

fn ops(source: &str) -> Vec<Op> {
    let assembly = match asm::assemble(source) {
        Ok(assembly) => assembly,
        Err(err) => panic!("assembly failed:\n{}", err),
    };
    assembly.code.iter().cloned().collect()
}

#[test]
fn literal_classification() {
    let expected = vec![
        Op::Push(Value::Bool(true)),
        Op::Push(Value::Bool(false)),
        Op::Push(Value::Int(42)),
        Op::Push(Value::Int(-7)),
        Op::Push(Value::Int(16)),
        Op::Push(Value::Int(0xBEEF)),
        Op::Push(Value::Float(1.5)),
        Op::Push(Value::Float(25.0)),
        Op::Push(Value::Char('x')),
    ];

    assert_eq!(ops("true FALSE 42 -7 0x10 beef 1.5 2.5e1 'x'"), expected);
}

#[test]
fn hex_wins_over_float_and_symbols() {
    // every 1-8 digit hex token is an integer, whatever else it looks like
    assert_eq!(
        ops("1e3 DEADBEEF"),
        vec![
            Op::Push(Value::Int(0x1E3)),
            Op::Push(Value::Int(0xDEAD_BEEFu32 as i32)),
        ]
    );
}

#[test]
fn string_line_emits_chars_and_length() {
    let expected = vec![
        Op::Push(Value::Char('A')),
        Op::Instr(Instr::SPACE),
        Op::Push(Value::Char('B')),
        Op::Instr(Instr::TAB),
        Op::Push(Value::Char('C')),
        Op::Push(Value::Int(5)),
    ];

    assert_eq!(ops("\"\"A B\tC"), expected);
}

#[test]
fn empty_string_line() {
    assert_eq!(ops("\"\""), vec![Op::Push(Value::Int(0))]);
}

#[test]
fn string_after_tokens_takes_the_rest_of_the_line() {
    let assembled = ops("42 \"\"rest of line");
    assert_eq!(assembled[0], Op::Push(Value::Int(42)));
    assert_eq!(assembled.last(), Some(&Op::Push(Value::Int(12))));
}

#[test]
fn comments_are_ignored() {
    assert_eq!(
        ops("; a whole line\n42 ; and a tail\n7"),
        vec![Op::Push(Value::Int(42)), Op::Push(Value::Int(7))]
    );
}

#[test]
fn mnemonics_are_case_insensitive() {
    assert_eq!(
        ops("pop DuP swap"),
        vec![
            Op::Instr(Instr::POP),
            Op::Instr(Instr::DUP),
            Op::Instr(Instr::SWAP),
        ]
    );
}

#[test]
fn backward_label_reference() {
    let assembly = asm::assemble("@start NOOP start").unwrap();
    assert_eq!(assembly.labels.len(), 1);
    assert_eq!(
        assembly.code.get(1),
        Some(&Op::Push(Value::Label(Label::new("START", 0))))
    );
}

#[test]
fn forward_label_reference_is_resolved_in_pass_two() {
    let assembly = asm::assemble("target NOOP @target").unwrap();
    assert_eq!(
        assembly.code.get(0),
        Some(&Op::Push(Value::Label(Label::new("TARGET", 2))))
    );
    // no placeholder survives pass 2
    assert!(assembly
        .code
        .iter()
        .all(|op| !matches!(op, Op::Symbol(_))));
}

#[test]
fn duplicate_label_is_fatal() {
    let err = asm::assemble("@a NOOP @a").unwrap_err();
    assert!(err.to_string().contains("already defined"));
}

#[test]
fn reserved_and_mnemonic_label_names_are_fatal() {
    assert!(asm::assemble("@begin").is_err());
    assert!(asm::assemble("@TRUE").is_err());
    assert!(asm::assemble("@pop").is_err());
}

#[test]
fn unknown_symbol_is_fatal() {
    let err = asm::assemble("NOWHERE JUMP").unwrap_err();
    assert!(err.to_string().contains("Unknown symbol: NOWHERE"));
}

#[test]
fn begin_records_the_entry_index() {
    let assembly = asm::assemble_program("NOOP BEGIN 0 EXIT").unwrap();
    assert_eq!(assembly.entry, Some(1));
}

#[test]
fn begin_twice_is_fatal() {
    let err = asm::assemble("BEGIN 0 EXIT BEGIN NOOP").unwrap_err();
    assert!(err.to_string().contains("BEGIN is already defined"));
}

#[test]
fn missing_begin_is_fatal_for_programs() {
    let err = asm::assemble_program("0 EXIT").unwrap_err();
    assert!(err
        .to_string()
        .contains("BEGIN is undefined or out of bounds"));
}

#[test]
fn begin_past_the_last_instruction_is_fatal() {
    let err = asm::assemble("0 EXIT BEGIN").unwrap_err();
    assert!(err
        .to_string()
        .contains("BEGIN is undefined or out of bounds"));
}

#[test]
fn hex_shadows_label_references() {
    // "ACE" is a valid hex literal, so the declared label is unreachable
    let assembly = asm::assemble("@ACE NOOP ACE").unwrap();
    assert_eq!(assembly.code.get(1), Some(&Op::Push(Value::Int(0xACE))));
}

#[test]
fn malformed_char_literal_is_an_unknown_symbol() {
    let err = asm::assemble("'ab'").unwrap_err();
    assert!(err.to_string().contains("Unknown symbol: 'ab'"));
}

#[test]
fn label_table_is_case_insensitive_and_one_shot() {
    let mut labels = crate::LabelTable::new();
    labels.add(Label::new("loop", 3)).unwrap();

    assert!(labels.exists("LOOP"));
    assert!(labels.exists("Loop"));
    assert_eq!(labels.get("loop").map(Label::index), Some(3));
    assert!(labels.add(Label::new("LOOP", 9)).is_err());

    assert_eq!(labels.remove("loop").map(|l| l.index()), Some(3));
    assert!(!labels.exists("loop"));
}

#[test]
fn crlf_sources_assemble() {
    let (_, code) = run_program("BEGIN 1 EXIT\r\n; comment\r\n");
    assert_eq!(code, 1);
}

#[test]
fn blank_lines_are_fine() {
    let (_, code) = run_program("\n\nBEGIN\n\n3 EXIT\n\n");
    assert_eq!(code, 3);
}
