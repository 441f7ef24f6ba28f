// File: src/main.rs
//
// Command-line entry point for tinypy.
// Reads one source file and runs it through the lexer, parser and
// interpreter, or dumps the intermediate tokens / tree for debugging.

use clap::Parser as ClapParser;
use colored::Colorize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tinypy::errors::ScriptError;
use tinypy::interpreter::Interpreter;
use tinypy::{lexer, parser, printer};

/// Exit status when the script file cannot be read.
const EXIT_NO_INPUT: u8 = 66;

#[derive(ClapParser)]
#[command(
    name = "tinypy",
    about = "tinypy: a small indentation-sensitive scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Path to the script to run
    file: PathBuf,

    /// Print the token stream and exit
    #[arg(long)]
    tokens: bool,

    /// Print the parsed syntax tree and exit
    #[arg(long, conflicts_with = "tokens")]
    ast: bool,
}

/// Installs a stderr subscriber when RUST_LOG is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Writes a debug dump to stdout. A reader that went away is not an error.
fn write_dump(text: &str) {
    let _ = writeln!(io::stdout().lock(), "{}", text);
}

fn run(cli: &Cli, code: &str) -> Result<(), ScriptError> {
    let tokens = lexer::tokenize(code)?;
    if cli.tokens {
        let lines: Vec<String> = tokens.iter().map(ToString::to_string).collect();
        write_dump(&lines.join("\n"));
        return Ok(());
    }

    let program = parser::Parser::new(tokens).parse()?;
    if cli.ast {
        write_dump(&printer::print_program(&program));
        return Ok(());
    }

    Interpreter::new().run(&program)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let code = match fs::read_to_string(&cli.file) {
        Ok(code) => code,
        Err(err) => {
            eprintln!(
                "{} cannot read '{}': {}",
                "error:".red().bold(),
                cli.file.display(),
                err
            );
            return ExitCode::from(EXIT_NO_INPUT);
        }
    };

    match run(&cli, &code) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let err = err.in_file(&cli.file.display().to_string(), &code);
            eprint!("{}", err);
            ExitCode::from(err.kind.exit_code())
        }
    }
}
