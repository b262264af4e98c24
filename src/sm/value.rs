use std::fmt;

use crate::types::{Cell, Int, Real};

use super::RuntimeFault;

/// Contents of a stack slot or memory cell. Booleans are `Int(0)` / `Int(1)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(Int),
    Real(Real),
    Text(String),
}

// Largest magnitude a real can have and still convert to Int without loss of
// the integral part.
const INT_LIMIT: Real = 9_007_199_254_740_992.0; // 2^53

impl Value {
    pub fn bool(b: bool) -> Self {
        Value::Int(Int::from(b))
    }

    /// Post-arithmetic normalisation: a result without a fractional part is
    /// stored as an integer, anything else stays real.
    pub fn normalize(n: Real) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() <= INT_LIMIT {
            Value::Int(n as Int)
        } else {
            Value::Real(n)
        }
    }

    /// Numeric view used by arithmetic and comparisons. Text is parsed.
    pub fn as_real(&self) -> Result<Real, RuntimeFault> {
        match self {
            Value::Int(n) => Ok(*n as Real),
            Value::Real(n) => Ok(*n),
            Value::Text(s) => s
                .trim()
                .parse::<Real>()
                .map_err(|_| RuntimeFault::NotNumeric(s.clone())),
        }
    }

    /// Interprets the value as a memory cell index.
    pub fn as_cell(&self) -> Result<Cell, RuntimeFault> {
        match self {
            Value::Int(n) if *n >= 0 => Ok(*n as Cell),
            Value::Text(s) => s
                .trim()
                .parse::<Cell>()
                .map_err(|_| RuntimeFault::NotNumeric(s.clone())),
            other => Err(RuntimeFault::InvalidAddress(other.to_string())),
        }
    }

    /// Only integer zero counts as false.
    pub fn is_false(&self) -> bool {
        matches!(self, Value::Int(0))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Real(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
            Value::Real(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Declared type of a value read by the input opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Integer,
    Real,
    Text,
    Boolean,
}

impl InputType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(InputType::Integer),
            "2" => Some(InputType::Real),
            "3" => Some(InputType::Text),
            "4" => Some(InputType::Boolean),
            _ => None,
        }
    }

    /// Converts a committed input line. Malformed numbers become `0`.
    pub fn convert(self, line: &str) -> Value {
        let trimmed = line.trim();

        match self {
            InputType::Integer | InputType::Boolean => trimmed
                .parse::<Int>()
                .map(Value::Int)
                .unwrap_or_default(),
            InputType::Real => trimmed
                .parse::<Real>()
                .map(Value::Real)
                .unwrap_or_default(),
            InputType::Text => Value::Text(line.to_string()),
        }
    }
}
