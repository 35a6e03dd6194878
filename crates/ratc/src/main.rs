use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use ratc::lexer::Lexer;
use ratc::{Error, ParseOptions, RatResult, TokenKind};
use tracing_subscriber::{fmt, EnvFilter};

const STDIN_PATH: &str = "-";

#[derive(Debug, Parser)]
#[command(name = "ratc", version, about = "Rat25S lexer and syntax checker")]
struct RatcArgs {
    #[command(subcommand)]
    command: RatcCommand,
}

#[derive(Debug, Subcommand)]
enum RatcCommand {
    /// Print the token table of a source file
    Tokens {
        /// Source file, or `-` for standard input
        file: PathBuf,
    },

    /// Check a source file against the Rat25S grammar
    Check {
        /// Source file, or `-` for standard input
        file: PathBuf,

        /// Print every grammar rule as it is reduced
        #[arg(long)]
        trace: bool,

        /// Do not echo matched tokens
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() {
    fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = RatcArgs::parse();
    tracing::trace!(?args, "parsed arguments");

    if let Err(error) = run(args.command) {
        eprintln!("error: {error}");
        process::exit(if error.is_io() { 2 } else { 1 });
    }
}

fn run(command: RatcCommand) -> RatResult<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match command {
        RatcCommand::Tokens { file } => {
            for token in Lexer::new(open_input(&file)?) {
                let token = token?;
                if token.kind == TokenKind::EndOfInput {
                    break;
                }
                writeln!(out, "{}", token.table_row())?;
            }
        }
        RatcCommand::Check { file, trace, quiet } => {
            let options = ParseOptions::default()
                .with_token_echo(!quiet)
                .with_rule_trace(trace);
            ratc::parse(open_input(&file)?, options, &mut out)?;
            writeln!(out, "ok: {} is a valid Rat25S program", file.display())?;
        }
    }

    out.flush()?;
    Ok(())
}

fn open_input(path: &Path) -> RatResult<Box<dyn Read>> {
    if path.as_os_str() == STDIN_PATH {
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(path).map_err(|error| {
        Error::Io(io::Error::new(
            error.kind(),
            format!("failed to read {}: {error}", path.display()),
        ))
    })?;
    Ok(Box::new(file))
}
