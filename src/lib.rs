pub mod config;
pub mod console;
pub mod diagnostics;
pub mod interpreter;
pub mod ops;
#[cfg(test)]
mod regression;
pub mod sm;
pub mod symbols;
pub mod syntax;
pub mod types;
pub mod unit;
