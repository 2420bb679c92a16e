use matches::assert_matches;

use super::*;
use crate::constants;
use crate::error::Fault;

#[test]
fn exit_sets_the_code() {
    let (_, code) = run_program("BEGIN 7 EXIT");
    assert_eq!(code, 7);
}

#[test]
fn call_saves_the_next_address() {
    // the subroutine returns to the instruction after the CALL
    let (_, code) = run_program("BEGIN SUB CALL 1 EXIT @SUB RETURN");
    assert_eq!(code, 1);
}

#[test]
fn jump_forward_to_a_late_label() {
    let (_, code) = run_program("BEGIN FIN JUMP 1 EXIT @FIN 0 EXIT");
    assert_eq!(code, 0);
}

#[test]
fn cjump_pops_label_then_flag() {
    let (_, code) = run_program("BEGIN true YES CJUMP 1 EXIT @YES 2 EXIT");
    assert_eq!(code, 2);

    let (_, code) = run_program("BEGIN false YES CJUMP 1 EXIT @YES 2 EXIT");
    assert_eq!(code, 1);
}

#[test]
fn return_without_call() {
    let err = run_err("BEGIN RETURN");
    assert_eq!(err.op.as_deref(), Some("RETURN"));
    assert_matches!(err.fault, Fault::CallStackUnderflow);
}

#[test]
fn runaway_recursion_overflows_the_call_stack() {
    let err = run_err("BEGIN @REC REC CALL 0 EXIT");
    assert_eq!(err.op.as_deref(), Some("CALL"));
    assert_matches!(err.fault, Fault::CallStackOverflow);
}

#[test]
fn running_off_the_end_is_a_fault() {
    let err = run_err("BEGIN NOOP");
    assert_eq!(err.op, None);
    assert_matches!(err.fault, Fault::BadIp(1));
}

#[test]
fn endless_pushing_overflows_the_data_stack() {
    let err = run_err("BEGIN @LOOP 0 LOOP JUMP");
    assert_matches!(err.fault, Fault::StackOverflow);
}

#[test]
fn abort_carries_the_message() {
    let err = run_err("BEGIN\n\"\"something broke\nABORT");
    assert_eq!(err.op.as_deref(), Some("ABORT"));
    assert_eq!(
        err.fault,
        Fault::Aborted("something broke".to_owned())
    );
}

#[test]
fn sleep_requires_a_positive_duration() {
    let (_, code) = run_program("BEGIN 5 SLEEP 0 EXIT");
    assert_eq!(code, 0);

    let err = run_err("BEGIN 0 SLEEP 0 EXIT");
    assert_matches!(err.fault, Fault::NotPositive(0));
}

#[test]
fn gettime_pushes_plausible_fields() {
    match eval("GETTIME").as_slice() {
        [Value::Int(h), Value::Int(m), Value::Int(s)] => {
            assert!((0..24).contains(h));
            assert!((0..60).contains(m));
            assert!((0..61).contains(s));
        }
        other => panic!("unexpected stack {:?}", other),
    }
}

#[test]
fn getdate_pushes_plausible_fields() {
    match eval("GETDATE").as_slice() {
        [Value::Int(y), Value::Int(mo), Value::Int(d)] => {
            assert!(*y >= 2020);
            assert!((1..=12).contains(mo));
            assert!((1..=31).contains(d));
        }
        other => panic!("unexpected stack {:?}", other),
    }
}

#[test]
fn execute_runs_a_fragment_and_pushes_its_exit_code() {
    let (_, code) = run_program("BEGIN\n\"\"42 EXIT\nEXECUTE\nEXIT");
    assert_eq!(code, 42);
}

#[test]
fn execute_nests_literally() {
    // three textual levels, the innermost exit code bubbles all the way up
    let mut source = "42 EXIT".to_owned();
    for _ in 0..3 {
        source = format!("{} EXECUTE EXIT", quoted_fragment(&source));
    }
    let (_, code) = run_program(&format!("BEGIN {}", source));
    assert_eq!(code, 42);
}

/// Emits code that pushes `text` as a character range, one literal at a
/// time, so a program can be embedded inside another single line.
fn quoted_fragment(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        match c {
            ' ' => out.push_str("SPACE "),
            c => {
                out.push('\'');
                out.push(c);
                out.push_str("' ");
            }
        }
    }
    out.push_str(&text.len().to_string());
    out
}

#[test]
fn execute_reports_nested_assembly_errors() {
    let (console, captured) = TestConsole::new();
    let (_, code) = run_with("BEGIN\n\"\"@x @x\nEXECUTE\nEXIT", console);
    assert_eq!(code, 0);
    assert!(captured.borrow().errors.contains("Fatal assembly error"));
}

#[test]
fn execute_reports_nested_runtime_errors() {
    let (console, captured) = TestConsole::new();
    let (_, code) = run_with("BEGIN\n\"\"POP\nEXECUTE\nEXIT", console);
    assert_eq!(code, 0);
    assert!(captured.borrow().errors.contains("Runtime error in POP"));
}

#[test]
fn execute_depth_errors_on_the_seventeenth_call() {
    // each frame decrements the counter at the stack bottom and, while it
    // is positive, re-runs the fragment copy it keeps above it; the chain
    // makes exactly as many EXECUTE calls as the starting counter
    const FRAGMENT: &str = "DUP 1 IADD DUPN DEPTH PICK 1 ISUB DUP DEPTH 1 ISUB PUT \
                            0 GREATER REC CJUMP DUP 1 IADD POPN 99 EXIT @REC EXECUTE EXIT";
    let source = |frames: usize| {
        format!(
            "BEGIN\n{}\n\"\"{}\nDUP 1 IADD DUPN\nEXECUTE\nEXIT",
            frames, FRAGMENT
        )
    };

    // a chain of exactly EXECUTE_DEPTH_LIMIT nested calls still completes
    let (console, captured) = TestConsole::new();
    let (_, code) = run_with(&source(constants::EXECUTE_DEPTH_LIMIT), console);
    assert_eq!(code, 99);
    assert_eq!(captured.borrow().errors, "");

    // one more frame fails in the deepest frame, on the 17th call
    let (console, captured) = TestConsole::new();
    let (_, code) = run_with(&source(constants::EXECUTE_DEPTH_LIMIT + 1), console);
    assert_eq!(code, 0);
    assert!(captured
        .borrow()
        .errors
        .contains("EXECUTE nested deeper than 16"));
}

#[test]
fn an_outer_label_corrupts_a_nested_jump() {
    let source = "\
BEGIN
END
\"\"JUMP
EXECUTE
POP
0 EXIT
@END
NOOP
0 EXIT";
    let (console, captured) = TestConsole::new();
    let (_, code) = run_with(source, console);
    assert_eq!(code, 0);
    assert!(captured
        .borrow()
        .errors
        .contains("instruction pointer 10 is out of bounds"));
}

#[test]
fn execute_restores_the_outer_program() {
    // the nested fragment halts; the outer program keeps running after it
    let source = "BEGIN\n\"\"9 EXIT\nEXECUTE\n1 IADD\nEXIT";
    let (_, code) = run_program(source);
    assert_eq!(code, 10);
}

#[test]
fn executing_a_placeholder_is_impossible_after_assembly() {
    let assembly = assemble("BEGIN 0 EXIT");
    assert!(assembly.code.iter().all(|op| !matches!(op, crate::code::Op::Symbol(_))));
}
