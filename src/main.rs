use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::{Builder, Env};
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::scanner::Scanner;
use rox::session::{EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR, EXIT_USAGE};
use rox::Lox;

#[derive(ClapParser, Debug)]
#[command(
    version,
    about = "Lox language interpreter",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Script to run; starts an interactive prompt when omitted
    #[arg(value_name = "SCRIPT")]
    scripts: Vec<PathBuf>,

    /// Write debug logs to FILE (rox.log when no FILE is given)
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "rox.log"
    )]
    log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token
        #[arg(long)]
        json: bool,
    },

    /// Parses a file as a program and prints each statement's AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },
}

/// Reads the contents of a file into a String
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger(log: Option<&Path>) -> Result<()> {
    let Some(path) = log else {
        // RUST_LOG still works, records go to stderr
        Builder::from_env(Env::default().default_filter_or("off")).init();
        return Ok(());
    };

    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

fn run_file(path: &Path) -> Result<i32> {
    info!("Running file {:?}", path);
    let source = read_file(path)?;

    let mut lox = Lox::new();
    lox.run(&source);

    io::stdout().flush()?;
    Ok(lox.exit_code())
}

fn run_prompt() -> Result<i32> {
    info!("Starting prompt");

    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        lox.run(&line);
        lox.reset();
    }

    debug!("Prompt closed");
    Ok(0)
}

fn tokenize(path: &Path, json: bool) -> Result<i32> {
    let source = read_file(path)?;
    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) if json => println!("{}", serde_json::to_string(&token)?),
            Ok(token) => println!("{}", token),
            Err(e) => {
                tokenized = false;
                debug!("Tokenization debug: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    Ok(if tokenized { 0 } else { EXIT_STATIC_ERROR })
}

fn parse(path: &Path) -> Result<i32> {
    let source = read_file(path)?;

    let mut lox = Lox::new();
    let statements = lox.parse(&source);

    if lox.had_error() {
        return Ok(EXIT_STATIC_ERROR);
    }

    info!("Parsed {} statements", statements.len());
    for stmt in &statements {
        println!("{}", AstPrinter.print_stmt(stmt));
    }

    Ok(0)
}

fn evaluate(path: &Path) -> Result<i32> {
    let source = read_file(path)?;

    let mut lox = Lox::new();
    match lox.evaluate(&source) {
        Some(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
            Ok(0)
        }
        None if lox.had_runtime_error() => Ok(EXIT_RUNTIME_ERROR),
        None => Ok(EXIT_STATIC_ERROR),
    }
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            e.exit()
        }
        Err(e) => {
            e.print()?;
            std::process::exit(EXIT_USAGE);
        }
    };

    init_logger(args.log.as_deref())?;

    info!("CLI arguments: {:?}", args);

    let code = match args.commands {
        Some(Commands::Tokenize { filename, json }) => tokenize(&filename, json)?,
        Some(Commands::Parse { filename }) => parse(&filename)?,
        Some(Commands::Evaluate { filename }) => evaluate(&filename)?,
        None => match args.scripts.as_slice() {
            [] => run_prompt()?,
            [script] => run_file(script)?,
            _ => {
                println!("Usage: rox [script]");
                EXIT_USAGE
            }
        },
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }

    Ok(())
}
