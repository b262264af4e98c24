use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::sm::{Alloc, CodeGenerator, Opcode, Program};
use crate::symbols::{Category, DeclarationError, Symbol, SymbolTable};
use crate::types::{Address, Cell};

const SEMANTIC: &str = "Semantic";

/// Output of a compilation without errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub program: Program,
    /// First cell not taken by a declaration.
    pub top_of_memory: Cell,
}

fn alloc_opcode(category: Category) -> Option<Opcode> {
    let alloc = match category {
        Category::Program => return None,
        Category::Integer => Alloc::Integer,
        Category::Real => Alloc::Real,
        Category::Text => Alloc::Text,
        Category::Boolean => Alloc::Boolean,
    };
    Some(Opcode::Alloc(alloc))
}

/// State threaded through one compilation by the parser's semantic actions.
///
/// Owns the symbol table, the code generator and the diagnostics. Nothing
/// here is shared between compilations; a fresh unit starts from address 1
/// and cell 1.
#[derive(Debug, Default)]
pub struct CompilationUnit {
    symbols: SymbolTable,
    generator: CodeGenerator,
    diagnostics: Diagnostics,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_program(&mut self, name: &str) -> Symbol {
        self.symbols.insert_program_name(name)
    }

    /// Declares a variable and emits its allocation instruction. A duplicate
    /// is reported as a semantic error and yields `None`.
    pub fn declare(
        &mut self,
        name: &str,
        category: Category,
        size: isize,
        line: usize,
        column: usize,
    ) -> Option<Symbol> {
        match self.symbols.insert(name, category, size) {
            Ok(symbol) => {
                if let Some(opcode) = alloc_opcode(category) {
                    self.generator.emit(opcode, symbol.cells());
                }
                Some(symbol)
            }
            Err(e @ DeclarationError::DuplicateDeclaration { .. }) => {
                self.diagnostics
                    .record_semantic_error(SEMANTIC, line, column, &e.to_string());
                None
            }
            Err(e) => {
                debug!(%e, "declaration rejected");
                None
            }
        }
    }

    /// Looks up an identifier used at `line`/`column`.
    pub fn resolve(&mut self, name: &str, line: usize, column: usize) -> Option<Symbol> {
        match self.symbols.lookup(name) {
            Ok(symbol) => Some(symbol.clone()),
            Err(_) => {
                let message = format!("undeclared identifier '{}'", name);
                self.diagnostics
                    .record_semantic_error(SEMANTIC, line, column, &message);
                None
            }
        }
    }

    pub fn emit(&mut self, opcode: Opcode, operand: impl ToString) -> Address {
        self.generator.emit(opcode, operand)
    }

    pub fn next_address(&self) -> Address {
        self.generator.next_address()
    }

    pub fn patch(&mut self, address: Address, operand: impl ToString) {
        self.generator.patch(address, operand)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn generator(&self) -> &CodeGenerator {
        &self.generator
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Hands over the program, or the surfaced diagnostics if any phase
    /// reported an error.
    pub fn finish(self) -> Result<Compiled, Vec<String>> {
        if self.diagnostics.has_errors() {
            return Err(self.diagnostics.messages());
        }

        Ok(Compiled {
            top_of_memory: self.symbols.top_of_memory(),
            program: self.generator.finish(),
        })
    }
}
