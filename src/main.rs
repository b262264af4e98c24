use std::path::PathBuf;

use clap::Parser;
use stackvm::config::VmConfig;
use stackvm::interpreter::Interpreter;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "stackvm")]
#[command(about = "Interactive stack machine for teaching compiler listings")]
struct Cli {
    /// Minimum number of data memory cells
    #[arg(long, default_value_t = stackvm::config::DEFAULT_MEMORY_CELLS)]
    memory_cells: usize,

    /// Ceiling on data memory; addresses at or above it fault
    #[arg(long, default_value_t = stackvm::config::DEFAULT_MAX_MEMORY_CELLS)]
    max_memory_cells: usize,

    /// Fault on unknown opcodes instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Line editor history file
    #[arg(long, default_value = "history.txt")]
    history: PathBuf,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,stackvm=info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();

    let mut config = VmConfig::default()
        .with_memory_cells(cli.memory_cells)
        .with_max_memory_cells(cli.max_memory_cells);
    if cli.strict {
        config = config.strict();
    }

    if let Err(e) = Interpreter::new(config).with_history(cli.history).run() {
        eprintln!("Failure: {}", e);
        std::process::exit(1);
    }
}
