use crate::types::Cell;

/// Default size of the data memory, in cells.
pub const DEFAULT_MEMORY_CELLS: Cell = 1000;

/// Default ceiling on the data memory, in cells.
pub const DEFAULT_MAX_MEMORY_CELLS: Cell = 1 << 20;

/// What the machine does with an opcode it does not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodePolicy {
    /// Log a warning and carry on with the next instruction.
    Permissive,
    /// Halt with a fault.
    Strict,
}

impl Default for OpcodePolicy {
    fn default() -> Self {
        OpcodePolicy::Permissive
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Lower bound for the data memory size. The machine grows it to cover
    /// every cell the program names directly.
    pub memory_cells: Cell,
    /// Memory never grows past this many cells. Addresses at or above it
    /// fault when accessed.
    pub max_memory_cells: Cell,
    pub opcode_policy: OpcodePolicy,
}

impl VmConfig {
    pub fn strict(mut self) -> Self {
        self.opcode_policy = OpcodePolicy::Strict;
        self
    }

    pub fn with_memory_cells(mut self, cells: Cell) -> Self {
        self.memory_cells = cells;
        self
    }

    pub fn with_max_memory_cells(mut self, cells: Cell) -> Self {
        self.max_memory_cells = cells;
        self
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            memory_cells: DEFAULT_MEMORY_CELLS,
            max_memory_cells: DEFAULT_MAX_MEMORY_CELLS,
            opcode_policy: OpcodePolicy::default(),
        }
    }
}
