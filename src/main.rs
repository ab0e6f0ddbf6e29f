//! Aurora CLI and REPL
//!
//! Usage:
//!   aurora run <file.aur>   - Evaluate an Aurora file
//!   aurora repl             - Start interactive REPL
//!   aurora help             - Show help message

use std::env;
use std::fs;
use std::process;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aurora::{Session, VERSION};

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        run_repl();
        return;
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: aurora run <file.aur>");
                process::exit(1);
            }
            run_file(&args[2]);
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => println!("Aurora {}", VERSION),
        _ => {
            if args[1].ends_with(".aur") {
                run_file(&args[1]);
            } else {
                eprintln!("{}: unknown command '{}'", "error".red(), args[1]);
                print_help();
                process::exit(1);
            }
        }
    }
}

/// Log to stderr only when RUST_LOG is set
fn init_logging() {
    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn print_help() {
    println!("{}", "Aurora".cyan().bold());
    println!("An expression-oriented scripting language");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  aurora run <file.aur>   Evaluate an Aurora file");
    println!("  aurora repl             Start interactive REPL");
    println!("  aurora help             Show this help message");
    println!("  aurora version          Show version\n");
    println!("{}", "LANGUAGE FEATURES:".yellow());
    println!("  set x = 10                      Assignment");
    println!("  if x > 5 then 1 eli x then 2 else 3");
    println!("  for i = 0 to 10 step 2 then set y = i");
    println!("  while x > 0 then set x = x - 1");
    println!("  fun add(a, b) -> a + b          Function definition");
}

fn run_file(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            process::exit(1);
        }
    };

    let mut session = Session::new();
    match session.evaluate(path, &source) {
        Ok(Some(value)) => println!("{}", value),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}", e.describe().red());
            process::exit(1);
        }
    }
}

fn run_repl() {
    println!("{} {} - {}",
        "Aurora".cyan().bold(),
        VERSION.cyan(),
        "an expression-oriented language".dimmed()
    );
    println!("Type {} to exit, {} for help\n",
        "exit".yellow(),
        "help".yellow()
    );

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("{}: cannot start line editor: {}", "error".red(), e);
            process::exit(1);
        }
    };

    // Bindings persist across REPL lines
    let mut session = Session::new();

    loop {
        match rl.readline(&format!("{} ", "aurora>".green().bold())) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" => {
                        println!("{}", "Thanks for using Aurora! See you soon!".cyan());
                        break;
                    }
                    "help" => {
                        print_help();
                        continue;
                    }
                    "clear" => {
                        session.reset();
                        println!("{}", "Bindings cleared.".dimmed());
                        continue;
                    }
                    _ => {}
                }

                match session.evaluate("<stdin>", line) {
                    Ok(Some(value)) => println!("{}", value.to_string().cyan()),
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", e.describe().red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Thanks for using Aurora! See you soon!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}
