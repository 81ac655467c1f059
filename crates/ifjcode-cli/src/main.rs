use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use ifjcode_config::{Config, ConfigLoader};
use std::io;
use std::process::ExitCode;

mod commands;
mod logging;

/// IFJcode interpreter.
///
/// Runs programs written in IFJcode, the three-address intermediate code of
/// the IFJ course compiler project. Programs are validated (syntax and
/// labels) before the first instruction executes.
///
/// EXAMPLES:
///     ifjcode run prog.ifj                    Run a program
///     ifjcode run prog.ifj --input in.txt     Feed READ from a file
///     ifjcode run prog.ifj --stats            Print instruction counts and price
///     ifjcode check prog.ifj                  Validate without running
///     ifjcode disasm prog.ifj                 Print a numbered listing
///
/// ENVIRONMENT VARIABLES:
///     IFJCODE_MAX_STEPS  Default step limit for `run`
///     IFJCODE_STATS      Set to '1' to print statistics after `run`
///     IFJCODE_TRACE      Interpreter log level (off, error, warn, info, debug, trace)
///     RUST_LOG           Full tracing filter; overrides IFJCODE_TRACE
///
/// EXIT CODES:
///     51 parse error, 52 label error, 53 type error, 54 undeclared variable,
///     55 missing frame, 56 empty stack, 57 arithmetic error,
///     58 string index error, 99 internal error
#[derive(Parser)]
#[command(name = "ifjcode")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an IFJcode program
    ///
    /// Program output goes to stdout. Faults, DPRINT and BREAK output,
    /// statistics and logs go to stderr.
    ///
    /// EXAMPLES:
    ///     ifjcode run prog.ifj                   Run a program
    ///     ifjcode run prog.ifj --max-steps 1000  Stop after 1000 instructions
    ///     ifjcode run prog.ifj --trace           Log every executed instruction
    #[command(visible_alias = "r")]
    Run {
        /// Path to the IFJcode source file
        file: String,
        /// Read input for READ from this file instead of stdin
        #[arg(long, short = 'i', value_name = "FILE")]
        input: Option<String>,
        /// Stop after this many executed instructions
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        max_steps: Option<u64>,
        /// Print execution statistics to stderr after the run
        #[arg(long, short = 's')]
        stats: bool,
        /// Log every executed instruction to stderr
        #[arg(long, short = 't')]
        trace: bool,
    },

    /// Parse a program and validate its labels without running it
    #[command(visible_alias = "c")]
    Check {
        /// Path to the IFJcode source file
        file: String,
    },

    /// Print a numbered listing of a program with resolved jump targets
    #[command(visible_alias = "d")]
    Disasm {
        /// Path to the IFJcode source file
        file: String,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     ifjcode completions bash > ~/.local/share/bash-completion/completions/ifjcode
    ///     ifjcode completions zsh > ~/.zfunc/_ifjcode
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Load project, global and environment configuration for the working directory
fn load_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    ConfigLoader::new()
        .load_from_directory(&cwd)
        .context("Failed to load configuration")
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "ifjcode", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config()?;

    match cli.command {
        Commands::Run {
            file,
            input,
            max_steps,
            stats,
            trace,
        } => {
            // Command-line flags override configuration
            let level = if trace {
                Some("trace")
            } else {
                config.trace_level()
            };
            logging::init(level);

            let options = commands::run::RunOptions {
                input,
                max_steps: max_steps.or(config.max_steps()),
                stats: stats || config.stats(),
            };
            commands::run::run(&file, &options)
        }
        Commands::Check { file } => {
            logging::init(config.trace_level());
            commands::check::run(&file)
        }
        Commands::Disasm { file } => {
            logging::init(config.trace_level());
            commands::disasm::run(&file)
        }
        Commands::Completions { .. } => Ok(ExitCode::SUCCESS),
    }
}
