use crate::types::Real;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl Op {
    /// Arithmetic is carried out on reals whatever the declared types were.
    /// Division by zero follows IEEE 754 and yields an infinity or NaN.
    pub fn apply(self, lhs: Real, rhs: Real) -> Real {
        match self {
            Op::Add => lhs + rhs,
            Op::Sub => lhs - rhs,
            Op::Mul => lhs * rhs,
            Op::Div => lhs / rhs,
            Op::Mod => lhs % rhs,
            Op::Pow => lhs.powf(rhs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Eq,
    NotEq,
}

impl LogicOp {
    pub fn apply(self, lhs: Real, rhs: Real) -> bool {
        match self {
            LogicOp::Less => lhs < rhs,
            LogicOp::LessOrEqual => lhs <= rhs,
            LogicOp::Greater => lhs > rhs,
            LogicOp::GreaterOrEqual => lhs >= rhs,
            LogicOp::Eq => lhs == rhs,
            LogicOp::NotEq => lhs != rhs,
        }
    }
}
