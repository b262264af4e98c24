use super::run;

#[test]
fn hello() {
    run(
        "
        (1, LDS, \"Hello, world\")
        (2, WRT, )
        (3, STP, )
        ",
        &[],
        "Hello, world\n",
    );
}

#[test]
fn echo_sum() {
    run(
        "
        (1, ALI, 1)
        (2, ALI, 1)
        (3, LDS, 'a?')
        (4, WRT, )
        (5, REA, 1)
        (6, STR, 1)
        (7, LDS, 'b?')
        (8, WRT, )
        (9, REA, 1)
        (10, STR, 2)
        (11, LDV, 1)
        (12, LDV, 2)
        (13, ADD, )
        (14, WRT, )
        (15, STP, )
        ",
        &["40", "2"],
        "a?\nb?\n42\n",
    );
}

#[test]
fn countdown() {
    // i := 3; repeat write(i); i := i - 1 until i == 0
    run(
        "
        (1, LDI, 3)
        (2, STR, 1)
        (3, LDV, 1)
        (4, WRT, )
        (5, LDV, 1)
        (6, LDI, 1)
        (7, SUB, )
        (8, STR, 1)
        (9, LDV, 1)
        (10, LDI, 0)
        (11, DIF, )
        (12, JMF, 14)
        (13, JMP, 3)
        (14, STP, )
        ",
        &[],
        "3\n2\n1\n",
    );
}

#[test]
fn falls_off_the_end() {
    run("(1, LDI, 1)\n(2, WRT, )", &[], "1\n");
}

#[test]
fn jump_past_the_end_halts() {
    run("(1, JMP, 99)\n(2, LDS, never)\n(3, WRT, )", &[], "");
}

#[test]
fn typed_reads() {
    run(
        "
        (1, REA, 2)
        (2, WRT, )
        (3, REA, 3)
        (4, WRT, )
        (5, REA, 4)
        (6, JMF, 9)
        (7, LDS, yes)
        (8, WRT, )
        (9, STP, )
        ",
        &["2.5", "some text", "1"],
        "2.5\nsome text\nyes\n",
    );
}

#[test]
fn real_results_keep_fraction() {
    run(
        "
        (1, LDR, 0.5)
        (2, LDR, 0.25)
        (3, ADD, )
        (4, WRT, )
        (5, LDI, 1)
        (6, LDI, 4)
        (7, DIV, )
        (8, LDI, 4)
        (9, MUL, )
        (10, WRT, )
        ",
        &[],
        "0.75\n1\n",
    );
}

#[test]
fn text_in_arithmetic() {
    run(
        "
        (1, REA, 3)
        (2, LDI, 2)
        (3, MUL, )
        (4, WRT, )
        ",
        &["21"],
        "42\n",
    );
}

#[test]
fn unknown_opcodes_are_skipped() {
    run("(1, XYZ, 1)\n(2, LDI, 5)\n(3, WRT, )", &[], "5\n");
}
