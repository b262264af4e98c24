use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::Editor;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::VmConfig;
use crate::console::{Console, Terminal};
use crate::sm::{self, Halt, ListingError, Program, VirtualMachine};
use crate::syntax;

const HELP: &str = "\
Enter listing lines such as `(1, LDI, 3)`, one instruction per line.

  :run     run the program entered so far
  :list    show the program
  :reset   forget the program
  :help    show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Append(String),
    Run,
    List,
    Reset,
    Help,
}

impl Command {
    fn parse(line: &str) -> syntax::Result<Command> {
        syntax::parse("command", parse::input_line, line)
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Parse error: {0}")]
    Parse(#[from] syntax::Error),

    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] ReadlineError),
}

pub struct Interpreter {
    config: VmConfig,
    program: Program,
    history: Option<PathBuf>,
}

impl Interpreter {
    pub fn new(config: VmConfig) -> Self {
        Interpreter {
            config,
            program: Program::new(),
            history: None,
        }
    }

    pub fn with_history(mut self, path: impl Into<PathBuf>) -> Self {
        self.history = Some(path.into());
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Appends one listing line. The line must carry the next address.
    pub fn append(&mut self, line: &str) -> Result<(), CommandError> {
        let text = format!("{}{}\n", self.program.listing(), line);
        self.program = Program::parse_listing(&text)?;
        Ok(())
    }

    /// Clears `console` and runs the current program on a fresh machine,
    /// framed by banners.
    pub fn run_program<C: Console + ?Sized>(&self, console: &mut C) -> Halt {
        console.clear();
        console.write("--- Execution started ---\n");
        let halt = VirtualMachine::new(self.program.clone(), self.config.clone()).run(console);
        console.write("--- Execution finished ---\n");

        info!(?halt, instructions = self.program.len(), "run finished");
        halt
    }

    pub fn execute(&mut self, command: Command, editor: &mut Editor<()>) -> Result<(), CommandError> {
        match command {
            Command::Append(line) => self.append(&line)?,
            Command::Run => {
                let mut console = Terminal::new(editor);
                self.run_program(&mut console);
            }
            Command::List if self.program.is_empty() => println!("No program."),
            Command::List => print!("{}", self.program),
            Command::Reset => self.program = Program::new(),
            Command::Help => println!("{}", HELP),
        }

        Ok(())
    }

    pub fn run(&mut self) -> Result<(), CommandError> {
        let mut rl = Editor::<()>::new();
        if let Some(path) = &self.history {
            if rl.load_history(path).is_err() {
                println!("No previous history.");
            }
        }

        loop {
            let prompt = format!("{:>3}> ", self.program.len() + 1);
            match rl.readline(&prompt) {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => {
                    rl.add_history_entry(line.as_str());

                    let result = Command::parse(line.as_str())
                        .map_err(CommandError::from)
                        .and_then(|command| {
                            debug!(?command, "execute");
                            self.execute(command, &mut rl)
                        });

                    if let Err(e) = result {
                        println!("{}", e);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(path) = &self.history {
            rl.save_history(path)?;
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}

/// Runs a complete listing non-interactively.
pub fn run_listing<C: Console + ?Sized>(
    listing: &str,
    config: VmConfig,
    console: &mut C,
) -> Result<Halt, CommandError> {
    let program = Program::parse_listing(listing)?;
    Ok(sm::run(program, config, console))
}

mod parse {
    // Input ::= ':run' | ':list' | ':reset' | ':help' | Line
    // Line ::= any text not starting with ':'

    use super::Command;
    use crate::syntax::{key, spaces, Input, Parsed};

    use nom::branch::alt;
    use nom::combinator::{map, rest, verify};
    use nom::sequence::preceded;

    pub fn input_line(input: Input) -> Parsed<Command> {
        alt((
            command(":run", Command::Run),
            command(":list", Command::List),
            command(":reset", Command::Reset),
            command(":help", Command::Help),
            map(
                preceded(spaces, verify(rest, |line: &str| !line.starts_with(':'))),
                |line: Input| Command::Append(line.trim_end().to_string()),
            ),
        ))(input)
    }

    fn command<'a>(name: &'a str, command: Command) -> impl Fn(Input<'a>) -> Parsed<Command> {
        map(key(name), move |_| command.clone())
    }
}
