use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::Ast;
use rox::error::Reporter;
use rox::lox::{Lox, RunStatus};
use rox::parser::Parser;
use rox::scanner::{scan_tokens, Scanner};
use rox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to rox.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses a file as a program and prints each statement's tree
    Parse { filename: PathBuf },

    /// Evaluates a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt (the default)
    Repl,
}

/// Maps a script into memory and checks it is UTF‑8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    // Zero‑length mappings are rejected on some platforms.
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the mapping is only read, and copied out before `file` is dropped.
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map file {:?}", filename))?;

    let text = std::str::from_utf8(&map)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?
        .to_owned();

    info!("Read {} bytes from {:?}", text.len(), filename);

    Ok(text)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("rox.log").context("Failed to create rox.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);

            writeln!(
                buf,
                "[{} {}:{}] - {}",
                Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to rox.log");
    Ok(())
}

/// Print and drop every diagnostic the session has collected.
fn flush_diagnostics(lox: &mut Lox) {
    for err in lox.take_diagnostics() {
        eprintln!("{}", err);
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let mut ok = true;

    if json {
        let mut reporter = Reporter::new();
        let tokens: Vec<Token> = scan_tokens(&source, &mut reporter);

        for err in reporter.take() {
            ok = false;
            eprintln!("{}", err);
        }

        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in Scanner::new(&source) {
            match token {
                Ok(token) => println!("{}", token),
                Err(e) => {
                    ok = false;
                    eprintln!("{}", e);
                }
            }
        }
    }

    Ok(if ok { 0 } else { RunStatus::CompileError.exit_code() })
}

fn parse(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let mut reporter = Reporter::new();

    let tokens = scan_tokens(&source, &mut reporter);
    let statements = Parser::new(&tokens, &mut reporter).parse();

    if reporter.had_error() {
        for err in reporter.take() {
            eprintln!("{}", err);
        }
        return Ok(RunStatus::CompileError.exit_code());
    }

    let printer = Ast;
    for stmt in &statements {
        println!("{}", printer.print_stmt(stmt));
    }

    Ok(0)
}

fn evaluate(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let mut lox = Lox::new();

    let code = match lox.evaluate(&source) {
        Ok(value) => {
            println!("{}", value);
            0
        }
        Err(status) => status.exit_code(),
    };

    flush_diagnostics(&mut lox);
    Ok(code)
}

fn run(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let mut lox = Lox::new();

    let status = lox.run(&source);
    flush_diagnostics(&mut lox);

    info!("Program finished: {:?}", status);
    Ok(status.exit_code())
}

fn repl() -> Result<i32> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let status = lox.run(&line);
        debug!("REPL line finished: {:?}", status);
        flush_diagnostics(&mut lox);
    }

    println!();
    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .parse_default_env()
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename, json } => tokenize(&filename, json)?,
        Commands::Parse { filename } => parse(&filename)?,
        Commands::Evaluate { filename } => evaluate(&filename)?,
        Commands::Run { filename } => run(&filename)?,
        Commands::Repl => repl()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }

    Ok(())
}
