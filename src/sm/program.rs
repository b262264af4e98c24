use std::fmt;

use nom::bytes::complete::take_while1;
use nom::character::complete::{not_line_ending, space0};
use nom::error::{ErrorKind, ParseError as _};
use nom::sequence::{delimited, preceded};
use thiserror::Error;

use crate::ops::{LogicOp, Op};
use crate::syntax::{self, key, Input, Parsed};
use crate::types::{parse::address, Address, Cell};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("Line {line}: {source}")]
    Syntax { line: usize, source: syntax::Error },

    #[error("Line {line}: expected address {expected}, found {found}")]
    Gap {
        line: usize,
        expected: Address,
        found: Address,
    },
}

/// Storage class reserved by an allocation opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alloc {
    Integer,
    Real,
    Text,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    Stop,
    LoadInt,
    LoadReal,
    LoadText,
    LoadBool,
    Arith(Op),
    Compare(LogicOp),
    Store,
    Load,
    StoreIndirect,
    LoadIndirect,
    Write,
    Read,
    Jump,
    JumpIfFalse,
    Alloc(Alloc),
    /// A mnemonic the machine does not know. Kept so that listings round trip.
    Unknown(String),
}

impl Opcode {
    pub fn mnemonic(&self) -> &str {
        match self {
            Opcode::Stop => "STP",
            Opcode::LoadInt => "LDI",
            Opcode::LoadReal => "LDR",
            Opcode::LoadText => "LDS",
            Opcode::LoadBool => "LDB",
            Opcode::Arith(Op::Add) => "ADD",
            Opcode::Arith(Op::Sub) => "SUB",
            Opcode::Arith(Op::Mul) => "MUL",
            Opcode::Arith(Op::Div) => "DIV",
            Opcode::Arith(Op::Mod) => "MOD",
            Opcode::Arith(Op::Pow) => "POW",
            Opcode::Compare(LogicOp::Eq) => "EQL",
            Opcode::Compare(LogicOp::NotEq) => "DIF",
            Opcode::Compare(LogicOp::Less) => "SMR",
            Opcode::Compare(LogicOp::Greater) => "BGR",
            Opcode::Compare(LogicOp::LessOrEqual) => "SME",
            Opcode::Compare(LogicOp::GreaterOrEqual) => "BGE",
            Opcode::Store => "STR",
            Opcode::Load => "LDV",
            Opcode::StoreIndirect => "STX",
            Opcode::LoadIndirect => "LDX",
            Opcode::Write => "WRT",
            Opcode::Read => "REA",
            Opcode::Jump => "JMP",
            Opcode::JumpIfFalse => "JMF",
            Opcode::Alloc(Alloc::Integer) => "ALI",
            Opcode::Alloc(Alloc::Real) => "ALR",
            Opcode::Alloc(Alloc::Text) => "ALS",
            Opcode::Alloc(Alloc::Boolean) => "ALB",
            Opcode::Unknown(name) => name,
        }
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpIfFalse)
    }

    /// Opcodes whose operand is a literal memory cell.
    pub fn is_direct(&self) -> bool {
        matches!(self, Opcode::Store | Opcode::Load)
    }
}

impl From<&str> for Opcode {
    fn from(mnemonic: &str) -> Self {
        match mnemonic.to_ascii_uppercase().as_str() {
            "STP" => Opcode::Stop,
            "LDI" => Opcode::LoadInt,
            "LDR" => Opcode::LoadReal,
            "LDS" => Opcode::LoadText,
            "LDB" => Opcode::LoadBool,
            "ADD" => Opcode::Arith(Op::Add),
            "SUB" => Opcode::Arith(Op::Sub),
            "MUL" => Opcode::Arith(Op::Mul),
            "DIV" => Opcode::Arith(Op::Div),
            "MOD" => Opcode::Arith(Op::Mod),
            "POW" => Opcode::Arith(Op::Pow),
            "EQL" => Opcode::Compare(LogicOp::Eq),
            "DIF" => Opcode::Compare(LogicOp::NotEq),
            "SMR" => Opcode::Compare(LogicOp::Less),
            "BGR" => Opcode::Compare(LogicOp::Greater),
            "SME" => Opcode::Compare(LogicOp::LessOrEqual),
            "BGE" => Opcode::Compare(LogicOp::GreaterOrEqual),
            "STR" => Opcode::Store,
            "LDV" => Opcode::Load,
            "STX" => Opcode::StoreIndirect,
            "LDX" => Opcode::LoadIndirect,
            "WRT" => Opcode::Write,
            "REA" => Opcode::Read,
            "JMP" => Opcode::Jump,
            "JMF" => Opcode::JumpIfFalse,
            "ALI" => Opcode::Alloc(Alloc::Integer),
            "ALR" => Opcode::Alloc(Alloc::Real),
            "ALS" => Opcode::Alloc(Alloc::Text),
            "ALB" => Opcode::Alloc(Alloc::Boolean),
            other => Opcode::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One instruction. Its address and opcode are fixed at emission; only the
/// operand may change afterwards (back-patching).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    address: Address,
    opcode: Opcode,
    operand: String,
}

impl Instruction {
    pub(in crate::sm) fn new(address: Address, opcode: Opcode, operand: String) -> Self {
        Instruction {
            address,
            opcode,
            operand,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    pub fn operand(&self) -> &str {
        &self.operand
    }

    pub(in crate::sm) fn set_operand(&mut self, operand: String) {
        self.operand = operand;
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.address, self.opcode, self.operand)
    }
}

/// A finished instruction stream with addresses `1..=len()` and no gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub(in crate::sm) instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn get(&self, address: Address) -> Option<&Instruction> {
        address
            .checked_sub(1)
            .and_then(|index| self.instructions.get(index))
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Highest cell named literally by a direct store or load.
    pub fn max_direct_cell(&self) -> Option<Cell> {
        self.instructions
            .iter()
            .filter(|i| i.opcode.is_direct())
            .filter_map(|i| i.operand.trim().parse::<Cell>().ok())
            .max()
    }

    /// One `(address, OPCODE, operand)` line per instruction.
    pub fn listing(&self) -> String {
        let mut listing = String::new();
        for instruction in &self.instructions {
            listing.push_str(&instruction.to_string());
            listing.push('\n');
        }
        listing
    }

    /// Rebuilds a program from [`listing`](Self::listing) output. Blank lines
    /// are skipped; addresses must run `1, 2, 3, ...` without gaps.
    pub fn parse_listing(text: &str) -> Result<Program, ListingError> {
        let mut program = Program::new();

        let lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        for (number, line) in lines {
            let line_no = number + 1;
            let (address, opcode, operand) =
                syntax::parse("instruction", instruction, line).map_err(|source| {
                    ListingError::Syntax {
                        line: line_no,
                        source,
                    }
                })?;

            let expected = program.len() + 1;
            if address != expected {
                return Err(ListingError::Gap {
                    line: line_no,
                    expected,
                    found: address,
                });
            }

            program
                .instructions
                .push(Instruction::new(address, opcode, operand));
        }

        Ok(program)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.listing())
    }
}

// Instruction ::= '(' Address ',' Mnemonic ',' Operand ')'
// Operand ::= everything up to the closing parenthesis that ends the line
fn instruction(input: Input) -> Parsed<(Address, Opcode, String)> {
    let (input, address) = preceded(key("("), address)(input)?;
    let (input, mnemonic) = delimited(
        key(","),
        preceded(space0, take_while1(|c: char| c.is_ascii_alphanumeric())),
        key(","),
    )(input)?;
    let (input, rest) = preceded(space0, not_line_ending)(input)?;
    let (_, operand) = operand(rest)?;

    Ok((input, (address, Opcode::from(mnemonic), operand.to_string())))
}

fn operand(input: Input) -> Parsed<Input> {
    let body = input.trim_end();

    match body.strip_suffix(')') {
        Some(operand) => Ok(("", operand.trim())),
        None => Err(nom::Err::Error(syntax::ParseError::from_error_kind(
            body,
            ErrorKind::Char,
        ))),
    }
}
