use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use lumen::ast_printer::Ast;
use lumen::interpreter::Interpreter;
use lumen::parser::Parser;
use lumen::resolver::Resolver;
use lumen::scanner::{scan_all, Scanner};
use lumen::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lumen language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input from a file and prints the AST of each statement
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lumen program
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module path and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'lumen::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("lumen::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn no_input_file() {
    println!("No input filepath was provided. Exiting...");

    std::process::exit(0);
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let buf = read_file(filename)?;
                let scanner = Scanner::new(&buf);
                let mut tokenized = true;

                for token in scanner {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            println!("{}", token);
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization debug: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => no_input_file(),
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let buf = read_file(filename)?;

                let tokens: Vec<Token> = match scan_all(&buf) {
                    Ok(tokens) => tokens,
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                let mut parser = Parser::new(&tokens);

                match parser.parse() {
                    Ok(statements) => {
                        info!("Parsed {} statements", statements.len());

                        let printer = Ast;

                        for stmt in &statements {
                            debug!("Parsed statement: {:?}", stmt);

                            if let lumen::ast::Stmt::Expression(expr)
                            | lumen::ast::Stmt::Print(expr) = stmt
                            {
                                println!("{}", printer.print(expr));
                            } else {
                                println!("{:?}", stmt);
                            }
                        }
                    }

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => no_input_file(),
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");

                let buf = read_file(filename)?;

                let tokens: Vec<Token> = match scan_all(&buf) {
                    Ok(tokens) => tokens,
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                let mut parser = Parser::new(&tokens);
                let mut interpreter = Interpreter::new();

                match parser.parse_expression() {
                    Ok(expr) => {
                        info!("Expression parsed successfully");

                        match interpreter.evaluate(&expr) {
                            Ok(value) => {
                                debug!("Evaluated to: {}", value);
                                println!("{}", value);
                            }

                            Err(e) => {
                                debug!("Evaluation debug: {}", e);
                                eprintln!("{}", e);
                                std::process::exit(70);
                            }
                        }
                    }

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Evaluate subcommand completed");
            }

            None => no_input_file(),
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let buf = read_file(filename)?;

                let tokens: Vec<Token> = match scan_all(&buf) {
                    Ok(tokens) => tokens,
                    Err(e) => {
                        debug!("Tokenization debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                info!("Scanned {} tokens", tokens.len());

                let mut parser = Parser::new(&tokens);

                let statements = match parser.parse() {
                    Ok(statements) => statements,
                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                info!("Parsed {} statements", statements.len());

                // Static resolution is fatal before any execution begins.
                let locals = match Resolver::new().resolve(&statements) {
                    Ok(locals) => locals,
                    Err(e) => {
                        debug!("Resolve debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                info!("Resolved {} local references", locals.len());

                let mut interpreter = Interpreter::new();

                match interpreter.interpret(&statements, locals) {
                    Ok(()) => {
                        info!("Program executed successfully");
                    }

                    Err(e) => {
                        debug!("Runtime debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }
            }

            None => no_input_file(),
        },
    }

    Ok(())
}
