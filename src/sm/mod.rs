mod generator;
mod machine;
mod program;
mod value;

use thiserror::Error;

use crate::console::Console;
use crate::config::VmConfig;
use crate::types::{Address, Cell};

pub use self::generator::CodeGenerator;
pub use self::machine::{CancelToken, Halt, State, VirtualMachine};
pub use self::program::{Alloc, Instruction, ListingError, Opcode, Program};
pub use self::value::{InputType, Value};

/// Conditions that stop a running machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeFault {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("cell {cell} is outside memory of {size} cells")]
    CellOutOfRange { cell: Cell, size: usize },

    #[error("'{0}' is not a memory address")]
    InvalidAddress(String),

    #[error("invalid operand '{operand}' for {opcode}")]
    InvalidOperand { opcode: String, operand: String },

    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("jump to address {0}")]
    JumpOutOfRange(Address),

    #[error("unknown opcode {0}")]
    UnknownOpcode(String),

    #[error("input closed")]
    InputClosed,

    #[error("execution cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, RuntimeFault>;

/// Runs `program` to completion against `console`.
pub fn run<C>(program: Program, config: VmConfig, console: &mut C) -> Halt
where
    C: Console + ?Sized,
{
    VirtualMachine::new(program, config).run(console)
}
