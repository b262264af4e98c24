use super::run_faulty;
use crate::config::DEFAULT_MAX_MEMORY_CELLS;
use crate::diagnostics::{LexicalErrorKind, Token, TokenKind};
use crate::sm::{Halt, RuntimeFault};
use crate::symbols::Category;
use crate::unit::CompilationUnit;

#[test]
fn division_by_zero_is_not_a_fault() {
    let (halt, output) = run_faulty("(1, LDI, 1)\n(2, LDI, 0)\n(3, DIV, )\n(4, WRT, )", &[]);

    assert_eq!(halt, Halt::Normal);
    assert_eq!(output, "inf\n");
}

#[test]
fn fault_stops_output() {
    let (halt, output) = run_faulty(
        "
        (1, LDS, before)
        (2, WRT, )
        (3, WRT, )
        (4, LDS, after)
        (5, WRT, )
        ",
        &[],
    );

    assert_eq!(halt, Halt::Fault(RuntimeFault::StackUnderflow));
    assert_eq!(output, "before\nRuntime error: stack underflow\n");
}

#[test]
fn huge_literal_addresses() {
    let (halt, output) = run_faulty(
        "(1, LDI, 1)\n(2, STR, 18446744073709551615)\n(3, STP, )",
        &[],
    );
    assert_eq!(
        halt,
        Halt::Fault(RuntimeFault::CellOutOfRange {
            cell: usize::MAX,
            size: 1000,
        })
    );
    assert!(output.starts_with("Runtime error: cell 18446744073709551615"));

    let (halt, _) = run_faulty("(1, LDV, 4000000000000)\n(2, STP, )", &[]);
    assert_eq!(
        halt,
        Halt::Fault(RuntimeFault::CellOutOfRange {
            cell: 4_000_000_000_000,
            size: DEFAULT_MAX_MEMORY_CELLS,
        })
    );
}

#[test]
fn negative_indirect_address() {
    let (halt, _) = run_faulty("(1, LDI, -1)\n(2, LDX, )", &[]);
    assert_eq!(halt, Halt::Fault(RuntimeFault::InvalidAddress("-1".into())));
}

#[test]
fn missing_input() {
    let (halt, output) = run_faulty("(1, REA, 1)\n(2, REA, 1)\n(3, ADD, )", &["1"]);

    assert_eq!(halt, Halt::Fault(RuntimeFault::InputClosed));
    assert_eq!(output, "Runtime error: input closed\n");
}

#[test]
fn bad_input_type_code() {
    let (halt, _) = run_faulty("(1, REA, 9)", &["1"]);
    assert_eq!(
        halt,
        Halt::Fault(RuntimeFault::InvalidOperand {
            opcode: "REA".into(),
            operand: "9".into(),
        })
    );
}

#[test]
fn lexical_errors_take_priority() {
    let mut unit = CompilationUnit::new();
    unit.declare("a", Category::Integer, 0, 1, 1);
    unit.declare("a", Category::Integer, 0, 2, 1);

    let semicolon = Token::new(TokenKind::Symbol, ";", 3, 4);
    unit.diagnostics_mut()
        .record_syntax_error(&semicolon, &["<IDENTIFIER>"], "declaration");

    let bad = Token::new(
        TokenKind::Invalid(LexicalErrorKind::IdentifierStartsWithDigit),
        "1abc",
        5,
        2,
    );
    unit.diagnostics_mut().record_lexical_error(&bad, "");
    unit.diagnostics_mut().record_lexical_error(&bad, "");

    assert_eq!(
        unit.finish(),
        Err(vec![
            "Lexical error at line 5, column 2: found \"1abc\". Identifiers must not start with a digit."
                .to_string()
        ])
    );
}

#[test]
fn syntax_error_messages() {
    let mut unit = CompilationUnit::new();
    let eof = Token::eof(9, 1);
    unit.diagnostics_mut().record_syntax_error(
        &eof,
        &["\"num\"", "\"real\"", "\"text\"", "\"flag\""],
        "declarations",
    );

    assert_eq!(
        unit.finish(),
        Err(vec![
            "Syntax error at line 9, column 1 (declarations): found end of file, expected: identifier type."
                .to_string()
        ])
    );
}
