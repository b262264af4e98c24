//! Programs emitted through a [`CompilationUnit`] the way the parser's
//! semantic actions drive it.

use super::run;
use crate::config::VmConfig;
use crate::console::ScriptedConsole;
use crate::ops::{LogicOp, Op};
use crate::sm::{Halt, Opcode, VirtualMachine};
use crate::symbols::Category;
use crate::unit::{CompilationUnit, Compiled};

fn compile(build: impl FnOnce(&mut CompilationUnit)) -> Compiled {
    let mut unit = CompilationUnit::new();
    unit.declare_program("test");
    build(&mut unit);
    unit.finish().unwrap()
}

fn execute(compiled: Compiled, inputs: &[&str]) -> String {
    let mut vm = VirtualMachine::new(compiled.program, VmConfig::default().with_memory_cells(0));
    vm.reserve(compiled.top_of_memory);

    let mut console = ScriptedConsole::new(inputs.iter().copied());
    assert_eq!(vm.run(&mut console), Halt::Normal);
    console.output().to_string()
}

#[test]
fn if_else() {
    // num x; read(x); if x > 10 then write('big') else write('small')
    let compiled = compile(|unit| {
        let x = unit.declare("x", Category::Integer, 0, 1, 5).unwrap();

        unit.emit(Opcode::Read, Category::Integer.code());
        unit.emit(Opcode::Store, x.base());

        unit.emit(Opcode::Load, x.base());
        unit.emit(Opcode::LoadInt, 10);
        unit.emit(Opcode::Compare(LogicOp::Greater), "");
        let jmf = unit.emit(Opcode::JumpIfFalse, "?");
        unit.emit(Opcode::LoadText, "'big'");
        unit.emit(Opcode::Write, "");
        let jmp = unit.emit(Opcode::Jump, "?");

        let else_branch = unit.next_address();
        unit.patch(jmf, else_branch);
        unit.emit(Opcode::LoadText, "'small'");
        unit.emit(Opcode::Write, "");

        let end = unit.next_address();
        unit.patch(jmp, end);
        unit.emit(Opcode::Stop, "");
    });

    run(&compiled.program.listing(), &["11"], "big\n");
    assert_eq!(execute(compiled.clone(), &["11"]), "big\n");
    assert_eq!(execute(compiled, &["10"]), "small\n");
}

#[test]
fn while_loop_sums_array() {
    // num v[5]; num i; num s;
    // i := 0; while i < 5 do v[i] := i * i; i := i + 1 end;
    // i := 0; s := 0; while i < 5 do s := s + v[i]; i := i + 1 end; write(s)
    let compiled = compile(|unit| {
        let v = unit.declare("v", Category::Integer, 5, 1, 5).unwrap();
        let i = unit.declare("i", Category::Integer, 0, 1, 12).unwrap();
        let s = unit.declare("s", Category::Integer, 0, 1, 15).unwrap();
        assert_eq!((v.base(), i.base(), s.base()), (1, 6, 7));

        let increment = |unit: &mut CompilationUnit| {
            unit.emit(Opcode::Load, i.base());
            unit.emit(Opcode::LoadInt, 1);
            unit.emit(Opcode::Arith(Op::Add), "");
            unit.emit(Opcode::Store, i.base());
        };
        let condition = |unit: &mut CompilationUnit| {
            unit.emit(Opcode::Load, i.base());
            unit.emit(Opcode::LoadInt, 5);
            unit.emit(Opcode::Compare(LogicOp::Less), "");
            unit.emit(Opcode::JumpIfFalse, "?")
        };

        unit.emit(Opcode::LoadInt, 0);
        unit.emit(Opcode::Store, i.base());
        let top = unit.next_address();
        let exit = condition(unit);
        unit.emit(Opcode::LoadInt, v.base());
        unit.emit(Opcode::Load, i.base());
        unit.emit(Opcode::Arith(Op::Add), "");
        unit.emit(Opcode::Load, i.base());
        unit.emit(Opcode::Load, i.base());
        unit.emit(Opcode::Arith(Op::Mul), "");
        unit.emit(Opcode::StoreIndirect, "");
        increment(unit);
        unit.emit(Opcode::Jump, top);
        let after = unit.next_address();
        unit.patch(exit, after);

        unit.emit(Opcode::LoadInt, 0);
        unit.emit(Opcode::Store, i.base());
        unit.emit(Opcode::LoadInt, 0);
        unit.emit(Opcode::Store, s.base());
        let top = unit.next_address();
        let exit = condition(unit);
        unit.emit(Opcode::Load, s.base());
        unit.emit(Opcode::LoadInt, v.base());
        unit.emit(Opcode::Load, i.base());
        unit.emit(Opcode::Arith(Op::Add), "");
        unit.emit(Opcode::LoadIndirect, "");
        unit.emit(Opcode::Arith(Op::Add), "");
        unit.emit(Opcode::Store, s.base());
        increment(unit);
        unit.emit(Opcode::Jump, top);
        let after = unit.next_address();
        unit.patch(exit, after);

        unit.emit(Opcode::Load, s.base());
        unit.emit(Opcode::Write, "");
        unit.emit(Opcode::Stop, "");
    });

    assert_eq!(compiled.top_of_memory, 8);
    assert_eq!(execute(compiled.clone(), &[]), "30\n");
    run(&compiled.program.listing(), &[], "30\n");
}

#[test]
fn no_placeholder_survives_patching() {
    let compiled = compile(|unit| {
        let jmf = unit.emit(Opcode::JumpIfFalse, "?");
        let jmp = unit.emit(Opcode::Jump, "?");
        unit.patch(jmp, 4);
        unit.patch(jmf, 3);
        unit.emit(Opcode::Stop, "");
        unit.emit(Opcode::Stop, "");
    });

    assert!(compiled
        .program
        .instructions()
        .all(|instruction| instruction.operand() != "?"));
    assert_eq!(
        compiled.program.listing(),
        "(1, JMF, 3)\n(2, JMP, 4)\n(3, STP, )\n(4, STP, )\n"
    );
}
