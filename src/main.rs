use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sublisp::memory::Memory;
use sublisp::{Config, Error, Interpreter, MAX_EVAL_DEPTH};

/// Substitution-model interpreter for a small S-expression language
#[derive(Parser, Debug)]
#[command(name = "sublisp", version, about, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Nesting level at which evaluation is aborted
    #[arg(long, global = true, default_value_t = MAX_EVAL_DEPTH)]
    max_depth: usize,

    /// Start without the prelude definitions
    #[arg(long, global = true)]
    no_prelude: bool,

    /// Log evaluation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive read-eval-print loop
    Repl,
    /// Evaluate a source file
    Run {
        /// Path to the file to evaluate
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug,rustyline=info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config {
        max_eval_depth: cli.max_depth,
        load_prelude: !cli.no_prelude,
    };

    let result = match &cli.command {
        Command::Repl => repl(config),
        Command::Run { file } => run(file, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(file: &Path, config: Config) -> Result<(), Error> {
    let source = std::fs::read_to_string(file)?;
    let mut interpreter = Interpreter::with_config(config, io::stdout())?;
    interpreter.evaluate(&source)?;
    if !interpreter.is_idle() {
        log::warn!(
            target: "repl",
            "{}: input ended inside an unclosed form",
            file.display()
        );
    }
    Ok(())
}

/// History file under the platform configuration directory, if one is available
fn history_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("org", "sublisp", "sublisp")?;
    let dir = dirs.config_dir();
    if let Err(err) = std::fs::create_dir_all(dir) {
        log::warn!(target: "repl", "cannot create {}: {err}", dir.display());
        return None;
    }
    Some(dir.join("history.txt"))
}

/// List global definitions, plain values before functions
fn print_environment(memory: &Memory) {
    if memory.is_empty() {
        println!("Memory is empty.");
        return;
    }

    println!("{} global definitions", memory.len());
    let (functions, values): (Vec<_>, Vec<_>) = memory
        .get_all_bindings()
        .into_iter()
        .partition(|(_, value)| value.is_lambda());

    println!("Values ({}):", values.len());
    for (name, value) in &values {
        println!("  {name} = {value}");
    }
    println!("Functions ({}):", functions.len());
    for (name, value) in &functions {
        println!("  {name} = {value}");
    }
}

fn repl(config: Config) -> Result<(), Error> {
    println!("sublisp {}", env!("CARGO_PKG_VERSION"));
    println!("Type (exit) to quit, :env to list definitions");

    let mut editor = DefaultEditor::new().map_err(|err| Error::Io(err.to_string()))?;
    let history = history_path();
    if let Some(path) = &history
        && editor.load_history(path).is_err()
    {
        log::debug!(target: "repl", "no history loaded from {}", path.display());
    }

    // Output is buffered so printed text and echoed values can be shown separately
    let mut interpreter = Interpreter::with_config(config, Vec::new())?;

    loop {
        let prompt = if interpreter.is_idle() { "> " } else { ". " };
        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);

                if interpreter.is_idle() {
                    match trimmed {
                        "(exit)" | ":quit" => break,
                        ":env" => {
                            print_environment(interpreter.memory());
                            continue;
                        }
                        _ => {}
                    }
                }

                // The newline ends a trailing token, as it would in a file
                let result = interpreter.evaluate(&format!("{line}\n"));

                let printed = interpreter.take_output();
                if !printed.is_empty() {
                    println!("{printed}");
                }
                match result {
                    Ok(values) => {
                        for value in values.iter().filter(|value| !value.is_void()) {
                            println!("=> {value}");
                        }
                    }
                    Err(err) => println!("Error: {err}"),
                }
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(err) => return Err(Error::Io(err.to_string())),
        }
    }

    println!("Bye!");
    if let Some(path) = &history
        && let Err(err) = editor.save_history(path)
    {
        log::warn!(target: "repl", "cannot save history to {}: {err}", path.display());
    }
    Ok(())
}
