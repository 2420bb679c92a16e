use super::*;

/// Prompts for a number and prints `1 2 .. n `, or complains on the error
/// stream when the input is not a number.
const COUNT_UP: &str = "\
; counts from 1 up to a number read from the console
BEGIN
\"\"Enter a number: 
PRINTSTR
GETLINE
DUP 1 IADD DUPN
STRISINT NOT BAD CJUMP
STRTOI
1
@LOOP
DUP 3 PICK LESSEQ
NOT DONE CJUMP
DUP PRINT
SPACE PRINT
1 IADD
LOOP JUMP
@DONE
NEWLINE PRINT
0 EXIT
@BAD
\"\"' is not a number.
JOIN
ERRORSTR
NEWLINE ERROR
1 EXIT
";

#[test]
fn count_to_three() {
    let (console, captured) = TestConsole::with_input(&["3"]);
    let (_, code) = run_with(COUNT_UP, console);

    assert_eq!(code, 0);
    assert_eq!(captured.borrow().output, "Enter a number: 1 2 3 \n");
    assert_eq!(captured.borrow().errors, "");
}

#[test]
fn count_to_zero_prints_nothing() {
    let (console, captured) = TestConsole::with_input(&["0"]);
    let (_, code) = run_with(COUNT_UP, console);

    assert_eq!(code, 0);
    assert_eq!(captured.borrow().output, "Enter a number: \n");
}

#[test]
fn non_numeric_input_goes_to_the_error_stream() {
    let (console, captured) = TestConsole::with_input(&["abc"]);
    let (_, code) = run_with(COUNT_UP, console);

    assert_eq!(code, 1);
    assert_eq!(captured.borrow().output, "Enter a number: ");
    assert_eq!(captured.borrow().errors, "abc' is not a number.\n");
}

#[test]
fn execute_round_trip() {
    let (_, code) = run_program("BEGIN\n\"\"42 EXIT\nEXECUTE\nEXIT");
    assert_eq!(code, 42);
}

#[test]
fn split_then_join_restores_the_range() {
    let (machine, code) = run_program(
        "BEGIN\n'A' 'B' 'C' 'D' 'E' 5\n2 SPLIT\nJOIN\n0 EXIT",
    );
    assert_eq!(code, 0);
    assert_eq!(
        machine.data().values(),
        &[
            Value::Char('A'),
            Value::Char('B'),
            Value::Char('C'),
            Value::Char('D'),
            Value::Char('E'),
            Value::Int(5),
        ][..]
    );
}

#[test]
fn disk_round_trip() {
    let (machine, code) = run_program(
        "BEGIN\n\"\"disk0\n16 4 MOUNT\n305419896 WRITEINT\n0 SEEK\nREADINT\n0 EXIT",
    );
    assert_eq!(code, 0);
    assert_eq!(machine.data().values(), &[Value::Int(305419896)][..]);
}

#[test]
fn forward_label_resolution_end_to_end() {
    // the JUMP target is declared after the JUMP; pass 2 resolves it
    let (console, captured) = TestConsole::new();
    let (_, code) = run_with(
        "BEGIN\nEND JUMP\n\"\"unreachable\nPRINTSTR\n@END\n0 EXIT",
        console,
    );
    assert_eq!(code, 0);
    assert_eq!(captured.borrow().output, "");
}
