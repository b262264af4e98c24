use std::collections::hash_map::Entry;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::types::{Cell, Var};

type SymbolIndex = fnv::FnvHashMap<Var, Symbol>;

/// First cell handed out by a fresh table. Cell 0 is never allocated.
pub const FIRST_FREE_CELL: Cell = 1;

/// Marker size of a scalar symbol.
pub const SCALAR: isize = -1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("Identifier '{name}' is already declared at address {base}")]
    DuplicateDeclaration { name: Var, base: Cell },

    #[error("Identifier '{0}' is not declared")]
    NotFound(Var),
}

pub type Result<T> = std::result::Result<T, DeclarationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Program,
    Integer,
    Real,
    Text,
    Boolean,
}

impl Category {
    /// Numeric category code used by the input opcode (`REA`).
    pub fn code(self) -> u8 {
        match self {
            Category::Program => 0,
            Category::Integer => 1,
            Category::Real => 2,
            Category::Text => 3,
            Category::Boolean => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Program => "program",
            Category::Integer => "num",
            Category::Real => "real",
            Category::Text => "text",
            Category::Boolean => "flag",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: Var,
    category: Category,
    base: Cell,
    size: isize,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn base(&self) -> Cell {
        self.base
    }

    /// `-1` for scalars, element count for arrays.
    pub fn size(&self) -> isize {
        self.size
    }

    pub fn is_array(&self) -> bool {
        self.size > 0
    }

    /// Number of memory cells the symbol occupies.
    pub fn cells(&self) -> usize {
        match self.category {
            Category::Program => 0,
            _ if self.is_array() => self.size as usize,
            _ => 1,
        }
    }

    /// Cell of the `index`-th element, `None` past the end of an array.
    pub fn element(&self, index: usize) -> Option<Cell> {
        if index < self.cells() {
            Some(self.base + index)
        } else {
            None
        }
    }
}

/// Owns every declared identifier and the free-address cursor.
///
/// Addresses are handed out monotonically and are never reused, so an array
/// of size N always occupies `[base, base + N - 1]`.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    index: SymbolIndex,
    next_free: Cell,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            index: SymbolIndex::default(),
            next_free: FIRST_FREE_CELL,
        }
    }

    pub fn insert(&mut self, name: &str, category: Category, size: isize) -> Result<Symbol> {
        let next_free = self.next_free;

        match self.index.entry(name.to_string()) {
            Entry::Occupied(v) => Err(DeclarationError::DuplicateDeclaration {
                name: name.to_string(),
                base: v.get().base,
            }),
            Entry::Vacant(v) => {
                let size = if size > 0 { size } else { SCALAR };
                let symbol = Symbol {
                    name: name.to_string(),
                    category,
                    base: next_free,
                    size,
                };

                v.insert(symbol.clone());
                self.next_free += if size > 0 { size as usize } else { 1 };

                debug!(name, %category, base = symbol.base, size, "declared");
                Ok(symbol)
            }
        }
    }

    /// Registers the program identifier. Occupies no memory.
    pub fn insert_program_name(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            category: Category::Program,
            base: 0,
            size: 0,
        };

        self.index.insert(name.to_string(), symbol.clone());
        symbol
    }

    pub fn lookup(&self, name: &str) -> Result<&Symbol> {
        self.index
            .get(name)
            .ok_or_else(|| DeclarationError::NotFound(name.to_string()))
    }

    /// The next free cell, i.e. the high-water mark of declared memory.
    pub fn top_of_memory(&self) -> Cell {
        self.next_free
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.index.values()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
