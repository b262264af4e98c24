use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::program::{Instruction, Opcode, Program};
use super::value::{InputType, Value};
use super::{Result, RuntimeFault};
use crate::config::{OpcodePolicy, VmConfig};
use crate::console::Console;
use crate::types::{Address, Cell, Int, Real};

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    Normal,
    Fault(RuntimeFault),
}

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Running,
    /// Suspended on `REA`; [`VirtualMachine::resume`] supplies the line.
    AwaitingInput(InputType),
    /// Terminal.
    Halted(Halt),
}

/// Shared flag checked by the machine before every instruction.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Retcode {
    Continue,
    Jump(Address),
    Output(Value),
    Input(InputType),
    Stop,
}

type Stack = Vec<Value>;

// Memory and operand stack. Kept apart from the program so an instruction
// can be borrowed while it executes.
struct StackMachine {
    memory: Vec<Value>,
    stack: Stack,
    policy: OpcodePolicy,
    max_cells: Cell,
}

fn operand<T: std::str::FromStr>(instruction: &Instruction) -> Result<T> {
    instruction
        .operand()
        .trim()
        .parse::<T>()
        .map_err(|_| RuntimeFault::InvalidOperand {
            opcode: instruction.opcode().to_string(),
            operand: instruction.operand().to_string(),
        })
}

fn jump_target(instruction: &Instruction) -> Result<Address> {
    match operand::<Address>(instruction)? {
        0 => Err(RuntimeFault::JumpOutOfRange(0)),
        target => Ok(target),
    }
}

/// Strips one matching pair of surrounding quotes.
fn unquote(text: &str) -> &str {
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));

    if quoted {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

impl StackMachine {
    fn pop(&mut self) -> Result<Value> {
        self.stack.pop().ok_or(RuntimeFault::StackUnderflow)
    }

    fn pop_real(&mut self) -> Result<Real> {
        self.pop()?.as_real()
    }

    fn load(&self, cell: Cell) -> Result<Value> {
        self.memory
            .get(cell)
            .cloned()
            .ok_or(RuntimeFault::CellOutOfRange {
                cell,
                size: self.memory.len(),
            })
    }

    fn store(&mut self, cell: Cell, value: Value) -> Result<()> {
        let size = self.memory.len();
        let slot = self
            .memory
            .get_mut(cell)
            .ok_or(RuntimeFault::CellOutOfRange { cell, size })?;

        *slot = value;
        Ok(())
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<Retcode> {
        match instruction.opcode() {
            Opcode::Stop => return Ok(Retcode::Stop),
            Opcode::LoadInt | Opcode::LoadBool => {
                let n = operand::<Int>(instruction)?;
                self.stack.push(Value::Int(n));
            }
            Opcode::LoadReal => {
                let n = operand::<Real>(instruction)?;
                self.stack.push(Value::Real(n));
            }
            Opcode::LoadText => {
                let text = unquote(instruction.operand());
                self.stack.push(Value::Text(text.to_string()));
            }
            Opcode::Arith(op) => {
                let rhs = self.pop_real()?;
                let lhs = self.pop_real()?;
                self.stack.push(Value::normalize(op.apply(lhs, rhs)));
            }
            Opcode::Compare(op) => {
                let rhs = self.pop_real()?;
                let lhs = self.pop_real()?;
                self.stack.push(Value::bool(op.apply(lhs, rhs)));
            }
            Opcode::Store => {
                let cell = operand::<Cell>(instruction)?;
                let value = self.pop()?;
                self.store(cell, value)?;
            }
            Opcode::Load => {
                let cell = operand::<Cell>(instruction)?;
                let value = self.load(cell)?;
                self.stack.push(value);
            }
            // stack: [.., cell, value]
            Opcode::StoreIndirect => {
                let value = self.pop()?;
                let cell = self.pop()?.as_cell()?;
                self.store(cell, value)?;
            }
            Opcode::LoadIndirect => {
                let cell = self.pop()?.as_cell()?;
                let value = self.load(cell)?;
                self.stack.push(value);
            }
            Opcode::Write => return Ok(Retcode::Output(self.pop()?)),
            Opcode::Read => {
                let kind = InputType::from_code(instruction.operand()).ok_or_else(|| {
                    RuntimeFault::InvalidOperand {
                        opcode: instruction.opcode().to_string(),
                        operand: instruction.operand().to_string(),
                    }
                })?;
                return Ok(Retcode::Input(kind));
            }
            Opcode::Jump => return Ok(Retcode::Jump(jump_target(instruction)?)),
            Opcode::JumpIfFalse => {
                if self.pop()?.is_false() {
                    return Ok(Retcode::Jump(jump_target(instruction)?));
                }
            }
            // memory was laid out by the symbol table at compile time
            Opcode::Alloc(_) => {}
            Opcode::Unknown(name) => match self.policy {
                OpcodePolicy::Permissive => {
                    warn!(opcode = %name, address = instruction.address(), "unknown opcode skipped");
                }
                OpcodePolicy::Strict => return Err(RuntimeFault::UnknownOpcode(name.clone())),
            },
        };

        Ok(Retcode::Continue)
    }
}

/// Executes a finished [`Program`].
///
/// The machine is driven either all at once through [`run`](Self::run) or one
/// instruction at a time through [`step`](Self::step). A `REA` instruction
/// suspends it in [`State::AwaitingInput`] until [`resume`](Self::resume) is
/// called with the committed line.
pub struct VirtualMachine {
    program: Program,
    machine: StackMachine,
    ip: Address,
    state: State,
    cancel: CancelToken,
}

impl VirtualMachine {
    pub fn new(program: Program, config: VmConfig) -> Self {
        let cells = program
            .max_direct_cell()
            .and_then(|cell| cell.checked_add(1))
            .unwrap_or(0)
            .max(config.memory_cells)
            .min(config.max_memory_cells);

        VirtualMachine {
            program,
            machine: StackMachine {
                memory: vec![Value::default(); cells],
                stack: Stack::new(),
                policy: config.opcode_policy,
                max_cells: config.max_memory_cells,
            },
            ip: 1,
            state: State::Running,
            cancel: CancelToken::new(),
        }
    }

    /// Grows memory so that cells `0..cells` exist, up to the configured
    /// ceiling.
    pub fn reserve(&mut self, cells: Cell) {
        let cells = cells.min(self.machine.max_cells);
        if self.machine.memory.len() < cells {
            self.machine.memory.resize(cells, Value::default());
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn ip(&self) -> Address {
        self.ip
    }

    pub fn stack(&self) -> &[Value] {
        &self.machine.stack
    }

    pub fn memory(&self) -> &[Value] {
        &self.machine.memory
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    fn halt(&mut self, halt: Halt) {
        debug!(?halt, ip = self.ip, "halted");
        self.state = State::Halted(halt);
    }

    fn fault<C: Console + ?Sized>(&mut self, console: &mut C, fault: RuntimeFault) {
        console.write(&format!("Runtime error: {}\n", fault));
        self.halt(Halt::Fault(fault));
    }

    /// Executes one instruction and returns the resulting state. Does nothing
    /// unless the machine is running. A fault is reported to `console` as it
    /// happens.
    pub fn step<C: Console + ?Sized>(&mut self, console: &mut C) -> State {
        if self.state != State::Running {
            return self.state.clone();
        }

        if self.cancel.is_cancelled() {
            self.fault(console, RuntimeFault::Cancelled);
            return self.state.clone();
        }

        let instruction = match self.program.get(self.ip) {
            Some(instruction) => instruction,
            None => {
                self.halt(Halt::Normal);
                return self.state.clone();
            }
        };

        trace!(%instruction, depth = self.machine.stack.len(), "dispatch");
        self.ip += 1;

        match self.machine.execute(instruction) {
            Ok(Retcode::Continue) => {}
            Ok(Retcode::Jump(target)) => self.ip = target,
            Ok(Retcode::Output(value)) => console.write(&format!("{}\n", value)),
            Ok(Retcode::Input(kind)) => {
                debug!(?kind, "awaiting input");
                self.state = State::AwaitingInput(kind);
            }
            Ok(Retcode::Stop) => self.halt(Halt::Normal),
            Err(fault) => self.fault(console, fault),
        }

        self.state.clone()
    }

    /// Completes a pending read with `line`. Returns `false` if no read was
    /// pending.
    pub fn resume(&mut self, line: &str) -> bool {
        match self.state {
            State::AwaitingInput(kind) => {
                self.machine.stack.push(kind.convert(line));
                self.state = State::Running;
                true
            }
            _ => false,
        }
    }

    /// Runs until the machine halts, serving reads from `console`.
    pub fn run<C: Console + ?Sized>(&mut self, console: &mut C) -> Halt {
        loop {
            match self.step(console) {
                State::Running => {}
                State::AwaitingInput(_) => match console.read() {
                    Some(line) => {
                        self.resume(&line);
                    }
                    None => self.fault(console, RuntimeFault::InputClosed),
                },
                State::Halted(halt) => return halt,
            }
        }
    }
}
