mod bad_programs;
mod compiled;
mod listings;

use crate::config::VmConfig;
use crate::console::ScriptedConsole;
use crate::sm::{Halt, Program, VirtualMachine};

/// Runs `listing` with the given input lines and checks everything it wrote.
/// The listing is also rendered and re-parsed; both copies must behave the
/// same.
pub fn run(listing: &str, inputs: &[&str], expected_output: &str) {
    let program = Program::parse_listing(listing).unwrap();
    let reparsed = Program::parse_listing(&program.listing()).unwrap();
    assert_eq!(reparsed, program);

    for program in vec![program, reparsed] {
        let mut console = ScriptedConsole::new(inputs.iter().copied());
        let halt = VirtualMachine::new(program, VmConfig::default()).run(&mut console);

        assert_eq!(halt, Halt::Normal, "output so far: {:?}", console.output());
        assert_eq!(console.output(), expected_output);
        assert_eq!(console.remaining_inputs(), 0);
    }
}

/// Runs `listing` and returns how it halted together with its output.
pub fn run_faulty(listing: &str, inputs: &[&str]) -> (Halt, String) {
    let program = Program::parse_listing(listing).unwrap();
    let mut console = ScriptedConsole::new(inputs.iter().copied());
    let halt = VirtualMachine::new(program, VmConfig::default()).run(&mut console);

    (halt, console.output().to_string())
}
