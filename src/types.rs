pub type Int = i64;
pub type Real = f64;
pub type Var = String;

/// 1-based position of an instruction in a program.
pub type Address = usize;

/// Index of a cell in the VM data memory.
pub type Cell = usize;

pub mod parse {
    use nom::bytes::complete::take_while1;
    use nom::combinator::map_res;

    use crate::syntax::{spaces, Input, Parsed};

    pub fn address(input: Input) -> Parsed<super::Address> {
        let (input, _) = spaces(input)?;
        map_res(take_while1(|c: char| c.is_ascii_digit()), |number: Input| {
            number.parse::<super::Address>()
        })(input)
    }
}
