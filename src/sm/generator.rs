use tracing::trace;

use super::program::{Instruction, Opcode, Program};
use crate::types::Address;

/// Builds a [`Program`] one instruction at a time.
///
/// Forward jumps are emitted with a placeholder operand and back-patched once
/// the target address is known:
///
/// ```text
/// let jmf = gen.emit(Opcode::JumpIfFalse, "?");
/// ... then-branch ...
/// gen.patch(jmf, gen.next_address());
/// ```
#[derive(Debug, Default)]
pub struct CodeGenerator {
    program: Program,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction and returns the address it was given.
    pub fn emit(&mut self, opcode: Opcode, operand: impl ToString) -> Address {
        let address = self.next_address();
        let instruction = Instruction::new(address, opcode, operand.to_string());

        trace!(%instruction, "emit");
        self.program.instructions.push(instruction);
        address
    }

    /// Address the next [`emit`](Self::emit) will return.
    pub fn next_address(&self) -> Address {
        self.program.len() + 1
    }

    /// Replaces the operand at `address`. Addresses outside the program are
    /// ignored.
    pub fn patch(&mut self, address: Address, operand: impl ToString) {
        let instruction = address
            .checked_sub(1)
            .and_then(|index| self.program.instructions.get_mut(index));

        match instruction {
            Some(instruction) => {
                instruction.set_operand(operand.to_string());
                trace!(%instruction, "patch");
            }
            None => trace!(address, "patch outside program ignored"),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn listing(&self) -> String {
        self.program.listing()
    }

    pub fn finish(self) -> Program {
        self.program
    }
}
