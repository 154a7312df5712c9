//! Uniform Language CLI
//!
//! Command-line interface for the Uniform programming language.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;
use log::LevelFilter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use uniform_lang::{parse, tokenize, Diagnostic, Session, UniformError, Value, VERSION};

#[derive(ClapParser)]
#[command(
    name = "uniform",
    version,
    about = "The Uniform scripting language",
    long_about = "Runs a Uniform script, or starts an interactive session when no file is given."
)]
struct Cli {
    /// Script to run; omit to start the REPL
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Show tokenization output (lexer only)
    #[arg(short, long)]
    tokens: bool,

    /// Show the parsed program in canonical form (parser only)
    #[arg(short, long)]
    ast: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,

    /// Log pipeline stages
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if cli.no_color || !io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    let Some(file) = cli.file else {
        println!("Uniform v{} - Language Interpreter", VERSION);
        println!("Type 'exit' to quit\n");
        if let Err(e) = repl() {
            eprintln!("Error reading input: {}", e);
            process::exit(1);
        }
        return;
    };

    let name = file.display().to_string();
    let source = match fs::read_to_string(&file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read file '{}': {}", name, e);
            process::exit(1);
        }
    };

    let result = if cli.tokens {
        show_tokens(&name, &source)
    } else if cli.ast {
        show_ast(&name, &source)
    } else {
        Session::new().run(&name, &source).map(|_| ())
    };

    if let Err(e) = result {
        report(e);
        process::exit(1);
    }
}

fn report(error: UniformError) {
    eprint!("{}", Diagnostic::new(error));
}

/// Show tokens from lexing a file
fn show_tokens(name: &str, source: &str) -> Result<(), UniformError> {
    let tokens = tokenize(name, source)?;

    println!("Tokens for '{}':", name);
    println!("{}", "=".repeat(60));

    for (i, token) in tokens.iter().enumerate() {
        println!("{:4}: {}", i, token);
    }

    println!("{}", "=".repeat(60));
    println!("Total tokens: {}", tokens.len());

    Ok(())
}

fn show_ast(name: &str, source: &str) -> Result<(), UniformError> {
    println!("{}", parse(name, source)?);
    Ok(())
}

/// Start an interactive REPL (Read-Eval-Print Loop)
fn repl() -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    let mut session = Session::new();

    loop {
        let line = match editor.readline("uniform > ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        };

        let input = line.trim();
        if input == "exit" || input == "quit" {
            break;
        }
        if !input.is_empty() {
            editor.add_history_entry(input)?;
        }

        match session.run("<stdin>", &line) {
            // A single statement shows its own value rather than a one-element list
            Ok(Some(Value::List(mut values))) if values.len() == 1 => {
                if let Some(value) = values.pop() {
                    println!("{}", value);
                }
            }
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => {}
            Err(e) => report(e),
        }
    }

    println!("\nGoodbye!");
    Ok(())
}
